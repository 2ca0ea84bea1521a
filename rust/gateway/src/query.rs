//! Read-only queries and credential checks, passed through to the
//! administration service with the same cancellation and error mapping as
//! the mutating operations.

use crate::dispatch::{self, Checkpoint};
use crate::endpoint::{EndpointEnvelope, EndpointProvider, EndpointResponse, ResponseKind};
use crate::error::GatewayError;
use crate::validator::{validate_cluster_id, validate_infobase_id, validate_user};
use ras_error::RasError;
use ras_types::{Authenticate, ClusterSummary, InfobaseSummary, SessionSummary};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug)]
pub struct ClusterQuery {
    provider: Arc<dyn EndpointProvider>,
}

impl ClusterQuery {
    pub fn new(provider: Arc<dyn EndpointProvider>) -> Self {
        Self { provider }
    }

    pub async fn authenticate(
        &self,
        auth: Authenticate,
        cancel: &CancellationToken,
    ) -> Result<(), GatewayError> {
        if let Some(cluster_id) = auth.scope.cluster_id() {
            validate_cluster_id(cluster_id)?;
        }
        validate_user(auth.credentials.user.as_deref())?;

        let scope = auth.scope.name();
        let cluster_id = auth.scope.cluster_id().map(str::to_string);
        tracing::info!(
            scope,
            cluster_id = cluster_id.as_deref(),
            user = auth.credentials.user.as_deref(),
            "Authenticate request"
        );

        match self
            .run(
                "Authenticate",
                cluster_id.as_deref(),
                EndpointEnvelope::authenticate(auth),
                cancel,
            )
            .await?
        {
            EndpointResponse::Authenticated => {
                tracing::info!(scope, cluster_id = cluster_id.as_deref(), "authenticated");
                Ok(())
            }
            other => Err(unexpected("Authenticate", ResponseKind::Authenticated, other)),
        }
    }

    pub async fn clusters(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ClusterSummary>, GatewayError> {
        match self
            .run("GetClusters", None, EndpointEnvelope::get_clusters(), cancel)
            .await?
        {
            EndpointResponse::Clusters(clusters) => Ok(clusters),
            other => Err(unexpected("GetClusters", ResponseKind::Clusters, other)),
        }
    }

    pub async fn cluster_info(
        &self,
        cluster_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ClusterSummary, GatewayError> {
        validate_cluster_id(cluster_id)?;
        match self
            .run(
                "GetClusterInfo",
                Some(cluster_id),
                EndpointEnvelope::get_cluster_info(cluster_id),
                cancel,
            )
            .await?
        {
            EndpointResponse::Cluster(cluster) => Ok(cluster),
            other => Err(unexpected("GetClusterInfo", ResponseKind::Cluster, other)),
        }
    }

    pub async fn sessions(
        &self,
        cluster_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SessionSummary>, GatewayError> {
        validate_cluster_id(cluster_id)?;
        match self
            .run(
                "GetSessions",
                Some(cluster_id),
                EndpointEnvelope::get_sessions(cluster_id),
                cancel,
            )
            .await?
        {
            EndpointResponse::Sessions(sessions) => Ok(sessions),
            other => Err(unexpected("GetSessions", ResponseKind::Sessions, other)),
        }
    }

    pub async fn infobases(
        &self,
        cluster_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<InfobaseSummary>, GatewayError> {
        validate_cluster_id(cluster_id)?;
        match self
            .run(
                "GetInfobasesShort",
                Some(cluster_id),
                EndpointEnvelope::get_infobases_short(cluster_id),
                cancel,
            )
            .await?
        {
            EndpointResponse::InfobaseSummaries(infobases) => Ok(infobases),
            other => Err(unexpected(
                "GetInfobasesShort",
                ResponseKind::InfobaseSummaries,
                other,
            )),
        }
    }

    pub async fn infobase_sessions(
        &self,
        cluster_id: &str,
        infobase_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SessionSummary>, GatewayError> {
        validate_cluster_id(cluster_id)?;
        validate_infobase_id(infobase_id)?;
        match self
            .run(
                "GetInfobaseSessions",
                Some(cluster_id),
                EndpointEnvelope::get_infobase_sessions(cluster_id, infobase_id),
                cancel,
            )
            .await?
        {
            EndpointResponse::Sessions(sessions) => Ok(sessions),
            other => Err(unexpected(
                "GetInfobaseSessions",
                ResponseKind::Sessions,
                other,
            )),
        }
    }

    async fn run(
        &self,
        operation: &'static str,
        cluster_id: Option<&str>,
        envelope: EndpointEnvelope,
        cancel: &CancellationToken,
    ) -> Result<EndpointResponse, GatewayError> {
        dispatch::checkpoint(cancel, Checkpoint::BeforeAcquire)?;
        let endpoint = dispatch::acquire(self.provider.as_ref(), operation, cancel).await?;
        dispatch::checkpoint(cancel, Checkpoint::BeforeSend)?;
        dispatch::send(endpoint.as_ref(), envelope, cancel)
            .await
            .inspect_err(|err| {
                if err.should_log_as_error() {
                    tracing::error!(
                        operation,
                        cluster_id,
                        error = %err.log_detail(),
                        code = %err.code(),
                        "RAS query failed"
                    );
                }
            })
    }
}

fn unexpected(
    request: &'static str,
    expected: ResponseKind,
    response: EndpointResponse,
) -> GatewayError {
    GatewayError::UnexpectedResponse {
        request,
        expected,
        actual: response.kind(),
    }
}
