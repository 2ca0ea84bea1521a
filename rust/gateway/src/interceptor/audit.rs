use super::{AuditMetadata, CallInfo, CallKind, Interceptor, Next, RequestView, StageKind};
use async_trait::async_trait;
use std::time::Instant;
use tonic::Status;

/// Methods whose successful completion is recorded at warn level.
pub const DESTRUCTIVE_METHODS: &[&str] = &["/infobase.service.InfobaseManagementService/DropInfobase"];

macro_rules! audit_record {
    ($level:expr, $message:literal, $record:expr) => {{
        let record = $record;
        tracing::event!(
            $level,
            operation = record.operation,
            duration_ms = record.duration_ms,
            result = record.result,
            cluster_id = record.metadata.cluster_id.as_deref(),
            infobase_id = record.metadata.infobase_id.as_deref(),
            user = record.metadata.user.as_deref(),
            error = record.error,
            grpc_code = record.grpc_code.as_deref(),
            $message
        );
    }};
}

struct AuditRecord<'a> {
    operation: &'static str,
    duration_ms: u64,
    result: &'static str,
    metadata: AuditMetadata,
    error: Option<&'a str>,
    grpc_code: Option<String>,
}

/// Writes exactly one structured record per call once the handler finished.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuditStage;

#[async_trait]
impl Interceptor for AuditStage {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn kind(&self) -> StageKind {
        StageKind::Observability
    }

    async fn intercept(&self, call: &CallInfo<'_>, next: Next<'_>) -> Result<(), Status> {
        let started = Instant::now();
        let outcome = next.run(call).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        let failure = outcome.as_ref().err();

        match &call.kind {
            CallKind::Stream {
                is_client_stream,
                is_server_stream,
            } => match failure {
                Some(status) => tracing::error!(
                    operation = call.method,
                    duration_ms,
                    result = "error",
                    is_client_stream,
                    is_server_stream,
                    error = status.message(),
                    grpc_code = ?status.code(),
                    "gRPC stream completed"
                ),
                None => tracing::info!(
                    operation = call.method,
                    duration_ms,
                    result = "success",
                    is_client_stream,
                    is_server_stream,
                    "gRPC stream completed"
                ),
            },
            CallKind::Unary(view) => {
                let metadata = match view {
                    RequestView::Message(message) => message.metadata(),
                    RequestView::Unstructured => AuditMetadata::default(),
                };
                let record = AuditRecord {
                    operation: call.method,
                    duration_ms,
                    result: if failure.is_some() { "error" } else { "success" },
                    metadata,
                    error: failure.map(Status::message),
                    grpc_code: failure.map(|status| format!("{:?}", status.code())),
                };
                if failure.is_some() {
                    audit_record!(tracing::Level::ERROR, "gRPC operation failed", record);
                } else if DESTRUCTIVE_METHODS.contains(&call.method) {
                    audit_record!(tracing::Level::WARN, "gRPC destructive operation", record);
                } else {
                    audit_record!(tracing::Level::INFO, "gRPC operation completed", record);
                }
            }
        }
        outcome
    }
}
