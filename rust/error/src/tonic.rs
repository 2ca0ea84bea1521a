use crate::{ErrorCodes, MappedEndpointError, RasError};

impl From<ErrorCodes> for tonic::Code {
    fn from(err: ErrorCodes) -> tonic::Code {
        match err {
            ErrorCodes::Success => tonic::Code::Ok,
            ErrorCodes::Cancelled => tonic::Code::Cancelled,
            ErrorCodes::InvalidArgument => tonic::Code::InvalidArgument,
            ErrorCodes::NotFound => tonic::Code::NotFound,
            ErrorCodes::AlreadyExists => tonic::Code::AlreadyExists,
            ErrorCodes::PermissionDenied => tonic::Code::PermissionDenied,
            ErrorCodes::ResourceExhausted => tonic::Code::ResourceExhausted,
            ErrorCodes::FailedPrecondition => tonic::Code::FailedPrecondition,
            ErrorCodes::Unimplemented => tonic::Code::Unimplemented,
            ErrorCodes::Internal => tonic::Code::Internal,
            ErrorCodes::Unavailable => tonic::Code::Unavailable,
            ErrorCodes::Unauthenticated => tonic::Code::Unauthenticated,
        }
    }
}

/// Builds the status returned to gRPC callers from any gateway error. The
/// status message is the error's display text.
pub fn status_from_error<E: RasError + ?Sized>(err: &E) -> tonic::Status {
    tonic::Status::new(err.code().into(), err.to_string())
}

impl From<MappedEndpointError> for tonic::Status {
    fn from(err: MappedEndpointError) -> Self {
        status_from_error(&err)
    }
}
