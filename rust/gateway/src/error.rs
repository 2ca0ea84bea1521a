use crate::endpoint::ResponseKind;
use ras_error::{ErrorCodes, MappedEndpointError, RasError, RasValidationError};
use ras_types::DropMode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] RasValidationError),
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation cancelled before RAS request")]
    CancelledBeforeSend,
    #[error("drop_mode {0} is not supported by RAS Binary Protocol. Only DROP_MODE_UNREGISTER_ONLY is available. To drop database files, use external database management tools after unregistering the infobase.")]
    UnsupportedDropMode(DropMode),
    #[error(transparent)]
    Endpoint(#[from] MappedEndpointError),
    #[error("unexpected {actual:?} response to {request}, expected {expected:?}")]
    UnexpectedResponse {
        request: &'static str,
        expected: ResponseKind,
        actual: ResponseKind,
    },
    #[error("RAS did not return the id of the created infobase")]
    MissingInfobaseId,
}

impl RasError for GatewayError {
    fn code(&self) -> ErrorCodes {
        match self {
            GatewayError::Validation(e) => e.code(),
            GatewayError::Cancelled | GatewayError::CancelledBeforeSend => ErrorCodes::Cancelled,
            GatewayError::UnsupportedDropMode(_) => ErrorCodes::Unimplemented,
            GatewayError::Endpoint(e) => e.code(),
            GatewayError::UnexpectedResponse { .. } | GatewayError::MissingInfobaseId => {
                ErrorCodes::Internal
            }
        }
    }

    /// Every endpoint failure is a system fault, whatever category the
    /// endpoint text maps to.
    fn should_log_as_error(&self) -> bool {
        match self {
            GatewayError::Endpoint(_) => true,
            other => !matches!(
                other.code(),
                ErrorCodes::InvalidArgument | ErrorCodes::Cancelled | ErrorCodes::Unimplemented
            ),
        }
    }
}

impl GatewayError {
    /// The text to log: the original endpoint message for endpoint failures,
    /// the display text otherwise.
    pub fn log_detail(&self) -> String {
        match self {
            GatewayError::Endpoint(mapped) => mapped.detail().to_string(),
            other => other.to_string(),
        }
    }
}

impl From<GatewayError> for tonic::Status {
    fn from(err: GatewayError) -> Self {
        ras_error::status_from_error(&err)
    }
}
