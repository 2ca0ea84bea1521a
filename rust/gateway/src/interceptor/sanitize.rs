use super::{CallInfo, CallKind, Interceptor, Next, RequestView, StageKind};
use async_trait::async_trait;
use tonic::Status;

/// Logs a credential-free copy of each inbound request at debug level. The
/// request handed to the handler is never touched.
#[derive(Clone, Copy, Debug, Default)]
pub struct SanitizeStage;

#[async_trait]
impl Interceptor for SanitizeStage {
    fn name(&self) -> &'static str {
        "sanitize"
    }

    fn kind(&self) -> StageKind {
        StageKind::Security
    }

    async fn intercept(&self, call: &CallInfo<'_>, next: Next<'_>) -> Result<(), Status> {
        match &call.kind {
            CallKind::Unary(RequestView::Message(message)) => {
                tracing::debug!(
                    method = call.method,
                    request = ?message.sanitized_view(),
                    "received gRPC request"
                );
            }
            CallKind::Unary(RequestView::Unstructured) => {
                tracing::debug!(method = call.method, "received gRPC request");
            }
            CallKind::Stream {
                is_client_stream,
                is_server_stream,
            } => {
                tracing::debug!(
                    method = call.method,
                    is_client_stream,
                    is_server_stream,
                    "received gRPC stream"
                );
            }
        }
        next.run(call).await
    }
}
