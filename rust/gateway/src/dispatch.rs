// Per-call steps shared by every operation that talks to the endpoint.

use crate::endpoint::{
    Endpoint, EndpointEnvelope, EndpointError, EndpointProvider, EndpointResponse,
};
use crate::error::GatewayError;
use ras_error::{MappedEndpointError, RasError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Checkpoint {
    BeforeAcquire,
    BeforeSend,
}

pub(crate) fn checkpoint(cancel: &CancellationToken, at: Checkpoint) -> Result<(), GatewayError> {
    if !cancel.is_cancelled() {
        return Ok(());
    }
    match at {
        Checkpoint::BeforeAcquire => Err(GatewayError::Cancelled),
        Checkpoint::BeforeSend => Err(GatewayError::CancelledBeforeSend),
    }
}

fn classify(err: &EndpointError) -> MappedEndpointError {
    MappedEndpointError::from_message(&err.to_string())
}

pub(crate) async fn acquire(
    provider: &dyn EndpointProvider,
    operation: &'static str,
    cancel: &CancellationToken,
) -> Result<Arc<dyn Endpoint>, MappedEndpointError> {
    provider.acquire(cancel).await.map_err(|err| {
        let mapped = classify(&err);
        tracing::error!(
            operation,
            error = %mapped.detail(),
            code = %mapped.code(),
            "failed to get RAS endpoint"
        );
        mapped
    })
}

/// Sends one envelope and checks the response kind against the one the
/// envelope asked for. Failures are classified but not logged.
pub(crate) async fn send(
    endpoint: &dyn Endpoint,
    envelope: EndpointEnvelope,
    cancel: &CancellationToken,
) -> Result<EndpointResponse, GatewayError> {
    let request = envelope.request.name();
    let expected = envelope.respond;
    let response = endpoint
        .send(envelope, cancel)
        .await
        .map_err(|err| classify(&err))?;
    if response.kind() != expected {
        return Err(GatewayError::UnexpectedResponse {
            request,
            expected,
            actual: response.kind(),
        });
    }
    Ok(response)
}
