use crate::{ErrorCodes, RasError};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct RasValidationError(#[from] pub validator::ValidationError);

impl RasValidationError {
    /// The name of the request field that failed validation.
    pub fn field(&self) -> &str {
        &self.0.code
    }
}

impl RasError for RasValidationError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}
