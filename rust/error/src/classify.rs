//! Classification of administration endpoint failures.
//!
//! The administration service does not return structured error codes, only
//! human-readable text. Every failure coming back from an endpoint goes through
//! [`map_endpoint_error`] before it reaches a caller, which turns that text into
//! one of the [`ErrorCodes`] categories.

use crate::{ErrorCodes, RasError};
use std::error::Error;
use thiserror::Error;

struct Rule {
    code: ErrorCodes,
    needles: &'static [&'static str],
    summary: &'static str,
}

// Evaluated in order, first match wins.
const RULES: &[Rule] = &[
    Rule {
        code: ErrorCodes::NotFound,
        needles: &["not found", "does not exist"],
        summary: "resource not found",
    },
    Rule {
        code: ErrorCodes::PermissionDenied,
        needles: &["access denied", "permission denied", "unauthorized"],
        summary: "access denied",
    },
    Rule {
        code: ErrorCodes::AlreadyExists,
        needles: &["already exists", "duplicate"],
        summary: "resource already exists",
    },
    Rule {
        code: ErrorCodes::InvalidArgument,
        needles: &["invalid", "bad request", "malformed"],
        summary: "invalid request parameters",
    },
    Rule {
        code: ErrorCodes::Unauthenticated,
        needles: &["authentication failed", "invalid credentials", "bad password"],
        summary: "authentication failed",
    },
    Rule {
        code: ErrorCodes::Unavailable,
        needles: &[
            "connection refused",
            "timeout",
            "unavailable",
            "connection failed",
        ],
        summary: "RAS service unavailable",
    },
    Rule {
        code: ErrorCodes::ResourceExhausted,
        needles: &["quota exceeded", "too many", "limit exceeded"],
        summary: "resource limit exceeded",
    },
    Rule {
        code: ErrorCodes::FailedPrecondition,
        needles: &["locked", "in use", "busy"],
        summary: "resource is locked or busy",
    },
];

fn matching_rule(message: &str) -> Option<&'static Rule> {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| lowered.contains(needle)))
}

/// Returns the category for a raw endpoint error message.
pub fn classify_message(message: &str) -> ErrorCodes {
    matching_rule(message)
        .map(|rule| rule.code)
        .unwrap_or(ErrorCodes::Internal)
}

/// An endpoint failure after classification.
///
/// The display text is what callers see: a fixed summary for classified
/// categories, or `RAS error: <original>` when nothing matched. The original
/// text is always kept in [`MappedEndpointError::detail`] for logging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MappedEndpointError {
    code: ErrorCodes,
    message: String,
    detail: String,
}

impl MappedEndpointError {
    pub fn from_message(original: &str) -> Self {
        match matching_rule(original) {
            Some(rule) => Self {
                code: rule.code,
                message: rule.summary.to_string(),
                detail: original.to_string(),
            },
            None => Self {
                code: ErrorCodes::Internal,
                message: format!("RAS error: {original}"),
                detail: original.to_string(),
            },
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl RasError for MappedEndpointError {
    fn code(&self) -> ErrorCodes {
        self.code
    }
}

/// Maps an optional endpoint error into the caller-facing taxonomy. `None`
/// maps to success.
pub fn map_endpoint_error<E>(err: Option<&E>) -> Result<(), MappedEndpointError>
where
    E: Error + ?Sized,
{
    match err {
        None => Ok(()),
        Some(err) => Err(MappedEndpointError::from_message(&err.to_string())),
    }
}
