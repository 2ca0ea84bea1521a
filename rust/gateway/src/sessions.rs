use crate::dispatch::{self, Checkpoint};
use crate::endpoint::{EndpointEnvelope, EndpointProvider};
use crate::error::GatewayError;
use crate::validator::{validate_cluster_id, validate_session_id};
use ras_error::RasError;
use ras_types::{SessionInfo, TerminateSession};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Session control against the administration endpoint.
#[derive(Clone, Debug)]
pub struct SessionControl {
    provider: Arc<dyn EndpointProvider>,
}

impl SessionControl {
    pub fn new(provider: Arc<dyn EndpointProvider>) -> Self {
        Self { provider }
    }

    pub async fn terminate(
        &self,
        req: TerminateSession,
        cancel: &CancellationToken,
    ) -> Result<(), GatewayError> {
        validate_cluster_id(&req.cluster_id)?;
        validate_session_id(&req.session_id)?;

        tracing::info!(
            cluster_id = %req.cluster_id,
            session_id = %req.session_id,
            "TerminateSession request"
        );

        dispatch::checkpoint(cancel, Checkpoint::BeforeAcquire)?;
        let endpoint = dispatch::acquire(self.provider.as_ref(), "TerminateSession", cancel).await?;
        let session = SessionInfo {
            cluster_id: req.cluster_id,
            uuid: req.session_id,
        };
        dispatch::checkpoint(cancel, Checkpoint::BeforeSend)?;
        dispatch::send(
            endpoint.as_ref(),
            EndpointEnvelope::terminate_session(session.clone()),
            cancel,
        )
        .await
        .inspect_err(|err| {
            if err.should_log_as_error() {
                tracing::error!(
                    cluster_id = %session.cluster_id,
                    session_id = %session.uuid,
                    error = %err.log_detail(),
                    code = %err.code(),
                    "failed to terminate session"
                );
            }
        })?;
        tracing::info!(
            cluster_id = %session.cluster_id,
            session_id = %session.uuid,
            "session terminated"
        );
        Ok(())
    }
}
