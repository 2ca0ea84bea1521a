//! Infobase lifecycle orchestration.
//!
//! Every operation runs the same sequence: validate the request, check for
//! cancellation, acquire an endpoint, (create only) look the name up, build
//! the wire record, check for cancellation again, send, and map the result.
//! Update is the only mutation primitive; lock and unlock are expressed as
//! updates and delegated.

use crate::dispatch::{self, Checkpoint};
use crate::endpoint::{Endpoint, EndpointEnvelope, EndpointProvider, EndpointResponse};
use crate::error::GatewayError;
use crate::validator::{
    validate_cluster_id, validate_dbms, validate_drop_mode, validate_infobase_id,
    validate_lock_schedule, validate_name, validate_server_fields,
};
use chrono::Utc;
use ras_error::{ErrorCodes, RasError};
use ras_types::{
    CreateInfobase, DropInfobase, DropMode, InfobaseInfo, InfobaseSummary, LockInfobase,
    UnlockInfobase, UpdateInfobase,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const CREATED_MESSAGE: &str = "Infobase created successfully";
pub const ALREADY_EXISTS_MESSAGE: &str = "Infobase already exists (idempotent operation)";
pub const UPDATED_MESSAGE: &str = "Infobase updated successfully";
pub const DROPPED_MESSAGE: &str = "Infobase dropped successfully";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub infobase_id: String,
    /// Only reported by create.
    pub name: Option<String>,
    pub message: String,
    pub success: bool,
}

impl LifecycleOutcome {
    fn succeeded(infobase_id: String, message: &str) -> Self {
        Self {
            infobase_id,
            name: None,
            message: message.to_string(),
            success: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct InfobaseLifecycle {
    provider: Arc<dyn EndpointProvider>,
}

impl InfobaseLifecycle {
    pub fn new(provider: Arc<dyn EndpointProvider>) -> Self {
        Self { provider }
    }

    pub async fn create_infobase(
        &self,
        req: CreateInfobase,
        cancel: &CancellationToken,
    ) -> Result<LifecycleOutcome, GatewayError> {
        validate_cluster_id(&req.cluster_id)?;
        validate_name(&req.name)?;
        let dbms = validate_dbms(req.dbms)?;
        validate_server_fields(dbms, &req.db_server, &req.db_name)?;

        tracing::info!(
            cluster_id = %req.cluster_id,
            name = %req.name,
            dbms = %dbms,
            db_server = %req.db_server,
            "CreateInfobase request"
        );

        dispatch::checkpoint(cancel, Checkpoint::BeforeAcquire)?;
        let endpoint = dispatch::acquire(self.provider.as_ref(), "CreateInfobase", cancel).await?;

        if let Some(existing) =
            find_by_name(endpoint.as_ref(), &req.cluster_id, &req.name, cancel).await?
        {
            tracing::info!(
                cluster_id = %req.cluster_id,
                name = %req.name,
                infobase_id = %existing.uuid,
                "idempotent CreateInfobase: infobase already exists"
            );
            return Ok(LifecycleOutcome {
                infobase_id: existing.uuid,
                name: Some(existing.name),
                message: ALREADY_EXISTS_MESSAGE.to_string(),
                success: true,
            });
        }

        let info = InfobaseInfo::from(&req);
        dispatch::checkpoint(cancel, Checkpoint::BeforeSend)?;
        let response = dispatch::send(
            endpoint.as_ref(),
            EndpointEnvelope::create_infobase(info),
            cancel,
        )
        .await
        .inspect_err(|err| log_failure("CreateInfobase", &req.cluster_id, None, err))?;

        let created = expect_infobase("CreateInfobase", response)?;
        let infobase_id = created
            .uuid
            .filter(|uuid| !uuid.is_empty())
            .ok_or(GatewayError::MissingInfobaseId)?;
        tracing::info!(
            cluster_id = %req.cluster_id,
            infobase_id = %infobase_id,
            name = %req.name,
            "infobase created"
        );
        Ok(LifecycleOutcome {
            infobase_id,
            name: Some(req.name),
            message: CREATED_MESSAGE.to_string(),
            success: true,
        })
    }

    pub async fn update_infobase(
        &self,
        req: UpdateInfobase,
        cancel: &CancellationToken,
    ) -> Result<LifecycleOutcome, GatewayError> {
        validate_cluster_id(&req.cluster_id)?;
        validate_infobase_id(&req.infobase_id)?;

        tracing::info!(
            cluster_id = %req.cluster_id,
            infobase_id = %req.infobase_id,
            sessions_deny = ?req.sessions_deny,
            scheduled_jobs_deny = ?req.scheduled_jobs_deny,
            "UpdateInfobase request"
        );

        dispatch::checkpoint(cancel, Checkpoint::BeforeAcquire)?;
        let endpoint = dispatch::acquire(self.provider.as_ref(), "UpdateInfobase", cancel).await?;

        let info = InfobaseInfo::from(&req);
        dispatch::checkpoint(cancel, Checkpoint::BeforeSend)?;
        let response = dispatch::send(
            endpoint.as_ref(),
            EndpointEnvelope::update_infobase(info),
            cancel,
        )
        .await
        .inspect_err(|err| {
            log_failure(
                "UpdateInfobase",
                &req.cluster_id,
                Some(&req.infobase_id),
                err,
            )
        })?;
        expect_infobase("UpdateInfobase", response)?;

        tracing::info!(
            cluster_id = %req.cluster_id,
            infobase_id = %req.infobase_id,
            "infobase updated"
        );
        Ok(LifecycleOutcome::succeeded(req.infobase_id, UPDATED_MESSAGE))
    }

    /// Unregisters an infobase from its cluster. The database itself is left
    /// in place; other drop modes are rejected before the endpoint is touched.
    pub async fn drop_infobase(
        &self,
        req: DropInfobase,
        cancel: &CancellationToken,
    ) -> Result<LifecycleOutcome, GatewayError> {
        validate_cluster_id(&req.cluster_id)?;
        validate_infobase_id(&req.infobase_id)?;
        let mode = validate_drop_mode(req.drop_mode)?;
        if mode != DropMode::UnregisterOnly {
            tracing::warn!(
                operation = "DropInfobase",
                cluster_id = %req.cluster_id,
                infobase_id = %req.infobase_id,
                drop_mode = %mode,
                "unsupported drop_mode requested"
            );
            return Err(GatewayError::UnsupportedDropMode(mode));
        }

        let audit = DropAudit::requested(&req, mode);

        if let Err(err) = dispatch::checkpoint(cancel, Checkpoint::BeforeAcquire) {
            audit.cancelled("before endpoint acquisition");
            return Err(err);
        }
        let endpoint =
            match dispatch::acquire(self.provider.as_ref(), "DropInfobase", cancel).await {
                Ok(endpoint) => endpoint,
                Err(err) => {
                    let err = GatewayError::from(err);
                    audit.failed(&err);
                    return Err(err);
                }
            };

        let info = InfobaseInfo {
            cluster_id: req.cluster_id.clone(),
            uuid: Some(req.infobase_id.clone()),
            ..Default::default()
        };
        if let Err(err) = dispatch::checkpoint(cancel, Checkpoint::BeforeSend) {
            audit.cancelled("before RAS request");
            return Err(err);
        }
        let sent = dispatch::send(
            endpoint.as_ref(),
            EndpointEnvelope::unregister_infobase(info),
            cancel,
        )
        .await
        .and_then(|response| expect_infobase("UnregisterInfobase", response));
        match sent {
            Ok(_) => {
                audit.completed();
                Ok(LifecycleOutcome::succeeded(
                    req.infobase_id.clone(),
                    DROPPED_MESSAGE,
                ))
            }
            Err(err) => {
                audit.failed(&err);
                Err(err)
            }
        }
    }

    pub async fn lock_infobase(
        &self,
        req: LockInfobase,
        cancel: &CancellationToken,
    ) -> Result<LifecycleOutcome, GatewayError> {
        validate_cluster_id(&req.cluster_id)?;
        validate_infobase_id(&req.infobase_id)?;
        validate_lock_schedule(req.denied_from, req.denied_to, Utc::now())?;

        tracing::info!(
            cluster_id = %req.cluster_id,
            infobase_id = %req.infobase_id,
            sessions_deny = req.sessions_deny,
            scheduled_jobs_deny = req.scheduled_jobs_deny,
            has_permission_code = req.permission_code.is_some(),
            "LockInfobase request"
        );

        self.update_infobase(UpdateInfobase::from(req), cancel).await
    }

    pub async fn unlock_infobase(
        &self,
        req: UnlockInfobase,
        cancel: &CancellationToken,
    ) -> Result<LifecycleOutcome, GatewayError> {
        validate_cluster_id(&req.cluster_id)?;
        validate_infobase_id(&req.infobase_id)?;

        tracing::info!(
            cluster_id = %req.cluster_id,
            infobase_id = %req.infobase_id,
            unlock_sessions = req.unlock_sessions,
            unlock_scheduled_jobs = req.unlock_scheduled_jobs,
            "UnlockInfobase request"
        );

        self.update_infobase(UpdateInfobase::from(req), cancel).await
    }
}

/// Looks an infobase up by exact, case-sensitive name. A lookup that fails
/// with `NotFound` means there is no such infobase; any other failure is
/// surfaced.
async fn find_by_name(
    endpoint: &dyn Endpoint,
    cluster_id: &str,
    name: &str,
    cancel: &CancellationToken,
) -> Result<Option<InfobaseSummary>, GatewayError> {
    let response = dispatch::send(
        endpoint,
        EndpointEnvelope::get_infobases_short(cluster_id),
        cancel,
    )
    .await;
    match response {
        Ok(EndpointResponse::InfobaseSummaries(summaries)) => {
            Ok(summaries.into_iter().find(|summary| summary.name == name))
        }
        Ok(other) => Err(GatewayError::UnexpectedResponse {
            request: "GetInfobasesShort",
            expected: crate::endpoint::ResponseKind::InfobaseSummaries,
            actual: other.kind(),
        }),
        Err(err) if err.code() == ErrorCodes::NotFound => Ok(None),
        Err(err) => {
            log_failure("GetInfobasesShort", cluster_id, None, &err);
            Err(err)
        }
    }
}

fn expect_infobase(
    request: &'static str,
    response: EndpointResponse,
) -> Result<InfobaseInfo, GatewayError> {
    match response {
        EndpointResponse::Infobase(info) => Ok(info),
        other => Err(GatewayError::UnexpectedResponse {
            request,
            expected: crate::endpoint::ResponseKind::Infobase,
            actual: other.kind(),
        }),
    }
}

fn log_failure(operation: &str, cluster_id: &str, infobase_id: Option<&str>, err: &GatewayError) {
    if err.should_log_as_error() {
        tracing::error!(
            operation,
            cluster_id,
            infobase_id,
            error = %err.log_detail(),
            code = %err.code(),
            "RAS request failed"
        );
    } else {
        tracing::info!(
            operation,
            cluster_id,
            infobase_id,
            error = %err.log_detail(),
            code = %err.code(),
            "RAS request rejected"
        );
    }
}

/// The audit trail of one drop. Created after the pre-call record is written;
/// exactly one closing record follows. If the call is abandoned without
/// settling (the future is dropped mid-flight), the closing record is the
/// `cancelled` one.
struct DropAudit<'a> {
    cluster_id: &'a str,
    infobase_id: &'a str,
    drop_mode: DropMode,
    settled: bool,
}

impl<'a> DropAudit<'a> {
    fn requested(req: &'a DropInfobase, drop_mode: DropMode) -> Self {
        tracing::warn!(
            operation = "DropInfobase",
            cluster_id = %req.cluster_id,
            infobase_id = %req.infobase_id,
            drop_mode = %drop_mode,
            cluster_user = req.credentials.user.as_deref(),
            requested_at = %Utc::now(),
            "destructive operation requested"
        );
        Self {
            cluster_id: &req.cluster_id,
            infobase_id: &req.infobase_id,
            drop_mode,
            settled: false,
        }
    }

    fn cancelled(mut self, stage: &'static str) {
        self.settled = true;
        self.log_cancelled(stage);
    }

    fn log_cancelled(&self, stage: &'static str) {
        tracing::info!(
            operation = "DropInfobase",
            cluster_id = %self.cluster_id,
            infobase_id = %self.infobase_id,
            drop_mode = %self.drop_mode,
            status = "cancelled",
            stage,
            "destructive operation cancelled"
        );
    }

    fn failed(mut self, err: &GatewayError) {
        self.settled = true;
        tracing::error!(
            operation = "DropInfobase",
            cluster_id = %self.cluster_id,
            infobase_id = %self.infobase_id,
            drop_mode = %self.drop_mode,
            status = "failed",
            error = %err.log_detail(),
            code = %err.code(),
            failed_at = %Utc::now(),
            "destructive operation failed"
        );
    }

    fn completed(mut self) {
        self.settled = true;
        tracing::warn!(
            operation = "DropInfobase",
            cluster_id = %self.cluster_id,
            infobase_id = %self.infobase_id,
            drop_mode = %self.drop_mode,
            status = "completed",
            completed_at = %Utc::now(),
            "destructive operation completed"
        );
    }
}

impl Drop for DropAudit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.log_cancelled("abandoned in flight");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointError, EndpointRequest};
    use crate::test_support::{ScriptedRas, CREATED_ID};
    use chrono::Duration;
    use ras_tracing::testing::EventCapture;
    use ras_types::{ClusterCredentials, DbmsKind};
    use tracing::Level;

    fn lifecycle(ras: &ScriptedRas) -> InfobaseLifecycle {
        InfobaseLifecycle::new(Arc::new(ras.clone()))
    }

    fn create_request(name: &str) -> CreateInfobase {
        CreateInfobase {
            cluster_id: "c1".to_string(),
            name: name.to_string(),
            dbms: Some(DbmsKind::PostgreSql),
            db_server: "pg01".to_string(),
            db_name: "acc".to_string(),
            db_user: Some("postgres".to_string()),
            db_password: Some("pg-secret".to_string()),
            locale: None,
            date_offset: None,
            description: Some("books".to_string()),
            security_level: None,
            scheduled_jobs_deny: None,
            license_distribution_allow: None,
            credentials: ClusterCredentials::default(),
        }
    }

    fn update_request() -> UpdateInfobase {
        UpdateInfobase {
            cluster_id: "c1".to_string(),
            infobase_id: "ib1".to_string(),
            description: Some("renamed".to_string()),
            ..Default::default()
        }
    }

    fn drop_request(mode: Option<DropMode>) -> DropInfobase {
        DropInfobase {
            cluster_id: "c1".to_string(),
            infobase_id: "ib1".to_string(),
            drop_mode: mode,
            credentials: ClusterCredentials {
                user: Some("admin".to_string()),
                password: Some("cluster-secret".to_string()),
            },
        }
    }

    fn lock_request() -> LockInfobase {
        LockInfobase {
            cluster_id: "c1".to_string(),
            infobase_id: "ib1".to_string(),
            sessions_deny: true,
            ..Default::default()
        }
    }

    fn unlock_request() -> UnlockInfobase {
        UnlockInfobase {
            cluster_id: "c1".to_string(),
            infobase_id: "ib1".to_string(),
            unlock_sessions: true,
            unlock_scheduled_jobs: true,
            ..Default::default()
        }
    }

    fn summary(uuid: &str, name: &str) -> InfobaseSummary {
        InfobaseSummary {
            uuid: uuid.to_string(),
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_sends_record_without_uuid() {
        let ras = ScriptedRas::default();
        let outcome = lifecycle(&ras)
            .create_infobase(create_request("accounting"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            LifecycleOutcome {
                infobase_id: CREATED_ID.to_string(),
                name: Some("accounting".to_string()),
                message: CREATED_MESSAGE.to_string(),
                success: true,
            }
        );
        let sent = ras.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], EndpointRequest::GetInfobasesShort { .. }));
        let EndpointRequest::CreateInfobase(info) = &sent[1] else {
            panic!("expected a create request, got {:?}", sent[1]);
        };
        assert_eq!(info.uuid, None);
        assert_eq!(info.dbms, Some(DbmsKind::PostgreSql));
        assert_eq!(info.db_password.as_deref(), Some("pg-secret"));
        assert_eq!(info.locale, None);
    }

    #[tokio::test]
    async fn test_second_create_is_idempotent() {
        let ras = ScriptedRas::default();
        let lifecycle = lifecycle(&ras);
        let cancel = CancellationToken::new();
        let first = lifecycle
            .create_infobase(create_request("accounting"), &cancel)
            .await
            .unwrap();

        ras.reply(Ok(EndpointResponse::InfobaseSummaries(vec![
            summary("ib-other", "Accounting"),
            summary(&first.infobase_id, "accounting"),
        ])));
        let second = lifecycle
            .create_infobase(create_request("accounting"), &cancel)
            .await
            .unwrap();
        assert_eq!(second.infobase_id, first.infobase_id);
        assert_eq!(second.message, ALREADY_EXISTS_MESSAGE);
        assert!(second.success);

        let creates = ras
            .sent()
            .iter()
            .filter(|req| matches!(req, EndpointRequest::CreateInfobase(_)))
            .count();
        assert_eq!(creates, 1);
    }

    #[tokio::test]
    async fn test_name_match_is_case_sensitive() {
        let ras = ScriptedRas::default();
        ras.reply(Ok(EndpointResponse::InfobaseSummaries(vec![summary(
            "ib-upper",
            "ACCOUNTING",
        )])));
        let outcome = lifecycle(&ras)
            .create_infobase(create_request("accounting"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.message, CREATED_MESSAGE);
        assert_eq!(outcome.infobase_id, CREATED_ID);
    }

    #[tokio::test]
    async fn test_lookup_not_found_means_absent() {
        let ras = ScriptedRas::default();
        ras.fail_with("infobase list not found");
        let outcome = lifecycle(&ras)
            .create_infobase(create_request("accounting"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.message, CREATED_MESSAGE);
    }

    #[tokio::test]
    async fn test_other_lookup_failures_are_surfaced() {
        let ras = ScriptedRas::default();
        ras.fail_with("Access denied for cluster admin");
        let err = lifecycle(&ras)
            .create_infobase(create_request("accounting"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::PermissionDenied);
        assert_eq!(ras.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_create_without_returned_uuid_is_internal() {
        let ras = ScriptedRas::default();
        ras.reply(Ok(EndpointResponse::InfobaseSummaries(vec![])))
            .reply(Ok(EndpointResponse::Infobase(InfobaseInfo::default())));
        let err = lifecycle(&ras)
            .create_infobase(create_request("accounting"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingInfobaseId));
        assert_eq!(err.code(), ErrorCodes::Internal);
    }

    #[tokio::test]
    async fn test_create_validation_happens_before_any_interaction() {
        let ras = ScriptedRas::default();
        let lifecycle = lifecycle(&ras);
        let cancel = CancellationToken::new();

        let mut bad_name = create_request("has space");
        let err = lifecycle.create_infobase(bad_name.clone(), &cancel).await.unwrap_err();
        assert_eq!(err.code(), ErrorCodes::InvalidArgument);

        bad_name.name = "accounting".to_string();
        bad_name.dbms = None;
        let err = lifecycle.create_infobase(bad_name.clone(), &cancel).await.unwrap_err();
        assert_eq!(err.to_string(), "dbms is required");

        bad_name.dbms = Some(DbmsKind::OracleDatabase);
        bad_name.db_name = String::new();
        let err = lifecycle.create_infobase(bad_name, &cancel).await.unwrap_err();
        assert_eq!(err.code(), ErrorCodes::InvalidArgument);

        assert_eq!(ras.interactions(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_only_present_fields() {
        let ras = ScriptedRas::default();
        let outcome = lifecycle(&ras)
            .update_infobase(update_request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, LifecycleOutcome::succeeded("ib1".to_string(), UPDATED_MESSAGE));
        let sent = ras.sent();
        assert_eq!(
            sent,
            vec![EndpointRequest::UpdateInfobase(InfobaseInfo {
                cluster_id: "c1".to_string(),
                uuid: Some("ib1".to_string()),
                description: Some("renamed".to_string()),
                ..Default::default()
            })]
        );
    }

    #[tokio::test]
    async fn test_update_failure_is_mapped() {
        let ras = ScriptedRas::default();
        ras.fail_with("Infobase is locked by another session");
        let err = lifecycle(&ras)
            .update_infobase(update_request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::FailedPrecondition);
        assert_eq!(err.to_string(), "resource is locked or busy");
    }

    #[tokio::test]
    async fn test_endpoint_rejection_is_logged_at_error() {
        let capture = EventCapture::default();
        let _guard = capture.install();
        let ras = ScriptedRas::default();
        ras.fail_with("invalid credentials for cluster admin");
        let err = lifecycle(&ras)
            .update_infobase(update_request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::InvalidArgument);

        let failed = capture.with_message("RAS request failed");
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].level, Level::ERROR);
        assert_eq!(
            failed[0].field("error"),
            Some("invalid credentials for cluster admin")
        );
        assert!(capture.with_message("RAS request rejected").is_empty());
    }

    #[tokio::test]
    async fn test_update_wrong_response_kind_is_internal() {
        let ras = ScriptedRas::default();
        ras.reply(Ok(EndpointResponse::InfobaseSummaries(vec![])));
        let err = lifecycle(&ras)
            .update_infobase(update_request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::Internal);
    }

    #[tokio::test]
    async fn test_acquire_failure_is_mapped() {
        let ras = ScriptedRas::default();
        ras.fail_acquire("dial tcp 10.0.0.1:1545: connection refused");
        let err = lifecycle(&ras)
            .update_infobase(update_request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::Unavailable);
        assert!(ras.sent().is_empty());
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_stops_every_operation() {
        let ras = ScriptedRas::default();
        let lifecycle = lifecycle(&ras);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = vec![
            lifecycle
                .create_infobase(create_request("accounting"), &cancel)
                .await,
            lifecycle.update_infobase(update_request(), &cancel).await,
            lifecycle
                .drop_infobase(drop_request(Some(DropMode::UnregisterOnly)), &cancel)
                .await,
            lifecycle.lock_infobase(lock_request(), &cancel).await,
            lifecycle.unlock_infobase(unlock_request(), &cancel).await,
        ];
        for result in results {
            let err = result.unwrap_err();
            assert_eq!(err.code(), ErrorCodes::Cancelled);
            assert!(!err.should_log_as_error());
        }
        assert_eq!(ras.interactions(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_after_acquire_stops_before_send() {
        let ras = ScriptedRas::default();
        let cancel = CancellationToken::new();
        ras.cancel_during_acquire(cancel.clone());
        let err = lifecycle(&ras)
            .update_infobase(update_request(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::CancelledBeforeSend));
        assert_eq!(err.to_string(), "operation cancelled before RAS request");
        assert_eq!(ras.acquires(), 1);
        assert!(ras.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_drop_modes_never_reach_the_endpoint() {
        let ras = ScriptedRas::default();
        let lifecycle = lifecycle(&ras);
        for mode in [DropMode::DropDatabase, DropMode::ClearDatabase] {
            let err = lifecycle
                .drop_infobase(drop_request(Some(mode)), &CancellationToken::new())
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCodes::Unimplemented);
            assert!(err.to_string().contains("Only DROP_MODE_UNREGISTER_ONLY is available"));
        }
        let err = lifecycle
            .drop_infobase(drop_request(None), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::InvalidArgument);
        assert_eq!(err.to_string(), "drop_mode is required");
        assert_eq!(ras.interactions(), 0);
    }

    #[tokio::test]
    async fn test_drop_success_audit_trail() {
        let capture = EventCapture::default();
        let _guard = capture.install();
        let ras = ScriptedRas::default();
        let outcome = lifecycle(&ras)
            .drop_infobase(
                drop_request(Some(DropMode::UnregisterOnly)),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.message, DROPPED_MESSAGE);
        assert_eq!(
            ras.sent(),
            vec![EndpointRequest::UnregisterInfobase(InfobaseInfo {
                cluster_id: "c1".to_string(),
                uuid: Some("ib1".to_string()),
                ..Default::default()
            })]
        );

        let requested = capture.with_message("destructive operation requested");
        assert_eq!(requested.len(), 1);
        assert_eq!(requested[0].level, Level::WARN);
        assert_eq!(requested[0].field("cluster_user"), Some("admin"));
        assert!(requested[0].field("requested_at").is_some());
        let completed = capture.with_message("destructive operation completed");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].level, Level::WARN);
        assert!(capture
            .with_message("destructive operation cancelled")
            .is_empty());
        assert!(!capture
            .events()
            .iter()
            .any(|event| event.fields.values().any(|v| v.contains("cluster-secret"))));
    }

    #[tokio::test]
    async fn test_drop_failure_audit_trail() {
        let capture = EventCapture::default();
        let _guard = capture.install();
        let ras = ScriptedRas::default();
        ras.fail_with("infobase ib1 does not exist");
        let err = lifecycle(&ras)
            .drop_infobase(
                drop_request(Some(DropMode::UnregisterOnly)),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::NotFound);
        let failed = capture.with_message("destructive operation failed");
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].level, Level::ERROR);
        assert_eq!(failed[0].field("error"), Some("infobase ib1 does not exist"));
        assert!(capture
            .with_message("destructive operation completed")
            .is_empty());
    }

    #[tokio::test]
    async fn test_drop_cancelled_at_either_checkpoint_is_audited() {
        let capture = EventCapture::default();
        let _guard = capture.install();

        let ras = ScriptedRas::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        lifecycle(&ras)
            .drop_infobase(drop_request(Some(DropMode::UnregisterOnly)), &cancel)
            .await
            .unwrap_err();

        let ras = ScriptedRas::default();
        let cancel = CancellationToken::new();
        ras.cancel_during_acquire(cancel.clone());
        lifecycle(&ras)
            .drop_infobase(drop_request(Some(DropMode::UnregisterOnly)), &cancel)
            .await
            .unwrap_err();
        assert!(ras.sent().is_empty());

        let cancelled = capture.with_message("destructive operation cancelled");
        assert_eq!(cancelled.len(), 2);
        for event in &cancelled {
            assert_eq!(event.level, Level::INFO);
            assert_eq!(event.field("status"), Some("cancelled"));
        }
        assert_eq!(cancelled[0].field("stage"), Some("before endpoint acquisition"));
        assert_eq!(cancelled[1].field("stage"), Some("before RAS request"));
    }

    #[tokio::test]
    async fn test_abandoned_drop_is_audited_as_cancelled() {
        let capture = EventCapture::default();
        let _guard = capture.install();
        let ras = ScriptedRas::default();
        ras.hang_on_send();
        let lifecycle = lifecycle(&ras);
        let cancel = CancellationToken::new();
        let call = lifecycle.drop_infobase(drop_request(Some(DropMode::UnregisterOnly)), &cancel);
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), call).await;
        assert!(timed_out.is_err());

        let cancelled = capture.with_message("destructive operation cancelled");
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].field("stage"), Some("abandoned in flight"));
        assert_eq!(ras.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_lock_is_an_update() {
        let ras = ScriptedRas::default();
        let now = Utc::now();
        let mut req = lock_request();
        req.scheduled_jobs_deny = false;
        req.denied_from = Some(now);
        req.denied_to = Some(now + Duration::hours(2));
        req.denied_message = Some("maintenance".to_string());
        req.permission_code = Some("1234".to_string());
        let outcome = lifecycle(&ras)
            .lock_infobase(req, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.infobase_id, "ib1");
        assert_eq!(outcome.message, UPDATED_MESSAGE);

        let sent = ras.sent();
        let [EndpointRequest::UpdateInfobase(info)] = sent.as_slice() else {
            panic!("expected exactly one update, got {sent:?}");
        };
        assert_eq!(info.sessions_deny, Some(true));
        assert_eq!(info.scheduled_jobs_deny, None);
        assert_eq!(info.denied_message.as_deref(), Some("maintenance"));
        assert_eq!(info.permission_code.as_deref(), Some("1234"));
        assert_eq!(info.denied_to, Some(now + Duration::hours(2)));
    }

    #[tokio::test]
    async fn test_lock_rejects_bad_schedule_without_interaction() {
        let ras = ScriptedRas::default();
        let now = Utc::now();
        let mut req = lock_request();
        req.denied_from = Some(now + Duration::hours(1));
        req.denied_to = Some(now);
        let err = lifecycle(&ras)
            .lock_infobase(req, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::InvalidArgument);
        assert_eq!(ras.interactions(), 0);
    }

    #[tokio::test]
    async fn test_unlock_is_an_update() {
        let ras = ScriptedRas::default();
        lifecycle(&ras)
            .unlock_infobase(unlock_request(), &CancellationToken::new())
            .await
            .unwrap();
        let sent = ras.sent();
        let [EndpointRequest::UpdateInfobase(info)] = sent.as_slice() else {
            panic!("expected exactly one update, got {sent:?}");
        };
        assert_eq!(info.sessions_deny, Some(false));
        assert_eq!(info.scheduled_jobs_deny, Some(false));
        assert_eq!(info.permission_code.as_deref(), Some(""));
        assert_eq!(info.denied_message, None);
    }

    #[test]
    fn test_endpoint_error_is_opaque_text() {
        let err = EndpointError::new("Quota exceeded");
        assert_eq!(err.to_string(), "Quota exceeded");
    }
}
