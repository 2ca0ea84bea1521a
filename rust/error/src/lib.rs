// Error categories surfaced by the gateway. The numeric values follow the gRPC
// status codes (https://grpc.github.io/grpc/core/md_doc_statuscodes.html) so
// that they convert losslessly at the RPC boundary.
use std::error::Error;

mod classify;
pub use classify::*;

#[cfg(feature = "tonic")]
mod tonic;
#[cfg(feature = "tonic")]
pub use tonic::*;

#[cfg(feature = "validator")]
mod validator;
#[cfg(feature = "validator")]
pub use validator::*;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ErrorCodes {
    // OK is returned on success, we use "Success" since Ok is a keyword in Rust.
    Success = 0,
    // CANCELLED indicates the operation was cancelled by the caller, observed at a local checkpoint.
    Cancelled = 1,
    // INVALID_ARGUMENT indicates the caller specified an invalid argument.
    InvalidArgument = 3,
    // NOT_FOUND means the addressed cluster, infobase or session does not exist.
    NotFound = 5,
    // ALREADY_EXISTS means an entity that we attempted to create already exists.
    AlreadyExists = 6,
    // PERMISSION_DENIED indicates the caller may not execute the operation.
    PermissionDenied = 7,
    // RESOURCE_EXHAUSTED indicates a quota or limit on the administration side was hit.
    ResourceExhausted = 8,
    // FAILED_PRECONDITION indicates the target is locked, busy or in use.
    FailedPrecondition = 9,
    // UNIMPLEMENTED indicates the administration protocol cannot express the request.
    Unimplemented = 12,
    // INTERNAL errors are everything the taxonomy could not classify.
    Internal = 13,
    // UNAVAILABLE indicates the administration endpoint is unreachable.
    Unavailable = 14,
    // UNAUTHENTICATED indicates the credentials were rejected.
    Unauthenticated = 16,
}

impl ErrorCodes {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCodes::Success => "Success",
            ErrorCodes::Cancelled => "Cancelled",
            ErrorCodes::InvalidArgument => "InvalidArgument",
            ErrorCodes::NotFound => "NotFound",
            ErrorCodes::AlreadyExists => "AlreadyExists",
            ErrorCodes::PermissionDenied => "PermissionDenied",
            ErrorCodes::ResourceExhausted => "ResourceExhausted",
            ErrorCodes::FailedPrecondition => "FailedPrecondition",
            ErrorCodes::Unimplemented => "Unimplemented",
            ErrorCodes::Internal => "Internal",
            ErrorCodes::Unavailable => "Unavailable",
            ErrorCodes::Unauthenticated => "Unauthenticated",
        }
    }
}

impl std::fmt::Display for ErrorCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub trait RasError: Error + Send {
    fn code(&self) -> ErrorCodes;
    fn boxed(self) -> Box<dyn RasError>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
    /// Local caller mistakes and caller-initiated cancellation are not system
    /// faults and should not be logged at error level.
    fn should_log_as_error(&self) -> bool {
        !matches!(
            self.code(),
            ErrorCodes::InvalidArgument | ErrorCodes::Cancelled | ErrorCodes::Unimplemented
        )
    }
}

impl Error for Box<dyn RasError> {}

impl RasError for Box<dyn RasError> {
    fn code(&self) -> ErrorCodes {
        self.as_ref().code()
    }
}

impl RasError for std::io::Error {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::Internal
    }
}
