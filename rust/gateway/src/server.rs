use crate::config::GatewayConfig;
use crate::endpoint::{self, EndpointProvider};
use crate::interceptor::{InterceptorChain, RequestView};
use crate::lifecycle::{InfobaseLifecycle, LifecycleOutcome};
use crate::query::ClusterQuery;
use crate::sessions::SessionControl;
use async_trait::async_trait;
use ras_config::Configurable;
use ras_error::{status_from_error, RasError};
use ras_types::ras_proto::infobase_management_service_server::{
    InfobaseManagementService, InfobaseManagementServiceServer,
};
use ras_types::ras_proto::ras_query_service_server::{RasQueryService, RasQueryServiceServer};
use ras_types::ras_proto::sessions_service_server::{SessionsService, SessionsServiceServer};
use ras_types::ras_proto::{
    AuthenticateAgentRequest, AuthenticateInfobaseRequest, AuthenticateResponse,
    ClusterAuthenticateRequest, CreateInfobaseRequest, CreateInfobaseResponse, DropInfobaseRequest,
    DropInfobaseResponse, GetClusterInfoRequest, GetClusterInfoResponse, GetClustersRequest,
    GetClustersResponse, GetInfobaseSessionsRequest, GetInfobaseSessionsResponse,
    GetInfobasesShortRequest, GetInfobasesShortResponse, GetSessionsRequest, GetSessionsResponse,
    LockInfobaseRequest, LockInfobaseResponse, TerminateSessionRequest, TerminateSessionResponse,
    UnlockInfobaseRequest, UnlockInfobaseResponse, UpdateInfobaseRequest, UpdateInfobaseResponse,
};
use ras_types::{
    Authenticate, CreateInfobase, DropInfobase, LockInfobase, TerminateSession, UnlockInfobase,
    UpdateInfobase,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::{CancellationToken, DropGuard};
use tonic::transport::Server;
use tonic::{Request, Response, Status};

pub const CREATE_INFOBASE: &str = "/infobase.service.InfobaseManagementService/CreateInfobase";
pub const UPDATE_INFOBASE: &str = "/infobase.service.InfobaseManagementService/UpdateInfobase";
pub const DROP_INFOBASE: &str = "/infobase.service.InfobaseManagementService/DropInfobase";
pub const LOCK_INFOBASE: &str = "/infobase.service.InfobaseManagementService/LockInfobase";
pub const UNLOCK_INFOBASE: &str = "/infobase.service.InfobaseManagementService/UnlockInfobase";
pub const TERMINATE_SESSION: &str = "/ras.service.SessionsService/TerminateSession";
pub const AUTHENTICATE_AGENT: &str = "/ras.service.RasQueryService/AuthenticateAgent";
pub const AUTHENTICATE_CLUSTER: &str = "/ras.service.RasQueryService/AuthenticateCluster";
pub const AUTHENTICATE_INFOBASE: &str = "/ras.service.RasQueryService/AuthenticateInfobase";
pub const GET_CLUSTERS: &str = "/ras.service.RasQueryService/GetClusters";
pub const GET_CLUSTER_INFO: &str = "/ras.service.RasQueryService/GetClusterInfo";
pub const GET_SESSIONS: &str = "/ras.service.RasQueryService/GetSessions";
pub const GET_SHORT_INFOBASES: &str = "/ras.service.RasQueryService/GetShortInfobases";
pub const GET_INFOBASE_SESSIONS: &str = "/ras.service.RasQueryService/GetInfobaseSessions";

const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// Parses a `grpc-timeout` value: at most eight ASCII digits followed by one
/// of the units `H`, `M`, `S`, `m`, `u`, `n`.
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if !value.is_ascii() || value.len() < 2 || value.len() > 9 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;
    match unit {
        "H" => Some(Duration::from_secs(amount * 60 * 60)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}

/// The cancellation scope of one RPC. The token fires when the caller's
/// deadline passes, and the scope cancels it on drop so the deadline timer
/// never outlives the call.
struct CallScope {
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl CallScope {
    fn for_request<T>(request: &Request<T>) -> Self {
        let cancel = CancellationToken::new();
        let deadline = request
            .metadata()
            .get(GRPC_TIMEOUT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_grpc_timeout);
        if let Some(timeout) = deadline {
            let timer = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => {
                        tracing::debug!(timeout_ms = timeout.as_millis() as u64, "caller deadline passed");
                        timer.cancel();
                    }
                    _ = timer.cancelled() => {}
                }
            });
        }
        Self {
            _guard: cancel.clone().drop_guard(),
            cancel,
        }
    }
}

fn invalid_request<E: RasError>(err: E) -> Status {
    status_from_error(&err)
}

#[derive(Clone, Debug)]
pub struct GatewayServer {
    config: GatewayConfig,
    lifecycle: InfobaseLifecycle,
    sessions: SessionControl,
    query: ClusterQuery,
    interceptors: InterceptorChain,
}

impl GatewayServer {
    pub fn new(
        config: GatewayConfig,
        provider: Arc<dyn EndpointProvider>,
        interceptors: InterceptorChain,
    ) -> Self {
        Self {
            config,
            lifecycle: InfobaseLifecycle::new(provider.clone()),
            sessions: SessionControl::new(provider.clone()),
            query: ClusterQuery::new(provider),
            interceptors,
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = format!("[::]:{}", self.config.port).parse()?;
        tracing::info!(%addr, "RAS gateway listening");

        let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<InfobaseManagementServiceServer<Self>>()
            .await;
        health_reporter
            .set_serving::<SessionsServiceServer<Self>>()
            .await;
        health_reporter
            .set_serving::<RasQueryServiceServer<Self>>()
            .await;

        let max_encoding_message_size = self.config.max_encoding_message_size;
        let max_decoding_message_size = self.config.max_decoding_message_size;
        let shutdown_grace_period = self.config.grpc_shutdown_grace_period;

        let server = Server::builder()
            .layer(ras_tracing::GrpcServerTraceLayer)
            .add_service(health_service)
            .add_service(
                InfobaseManagementServiceServer::new(self.clone())
                    .max_decoding_message_size(max_decoding_message_size)
                    .max_encoding_message_size(max_encoding_message_size),
            )
            .add_service(
                SessionsServiceServer::new(self.clone())
                    .max_decoding_message_size(max_decoding_message_size)
                    .max_encoding_message_size(max_encoding_message_size),
            )
            .add_service(
                RasQueryServiceServer::new(self)
                    .max_decoding_message_size(max_decoding_message_size)
                    .max_encoding_message_size(max_encoding_message_size),
            );

        let server = server.serve_with_shutdown(addr, async {
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::error!("Failed to create signal handler: {:?}", e);
                    return;
                }
            };
            sigterm.recv().await;
            tracing::info!("Received SIGTERM, waiting for grace period...");
            tokio::time::sleep(shutdown_grace_period).await;
            tracing::info!("Grace period ended, shutting down server...");
        });

        Ok(server.await?)
    }
}

#[async_trait]
impl Configurable<GatewayConfig> for GatewayServer {
    async fn try_from_config(config: &GatewayConfig) -> Result<Self, Box<dyn RasError>> {
        let provider = endpoint::from_config(&config.endpoint).await?;
        Ok(Self::new(
            config.clone(),
            provider,
            InterceptorChain::standard(),
        ))
    }
}

fn outcome_parts(outcome: LifecycleOutcome) -> (String, String, bool) {
    (outcome.infobase_id, outcome.message, outcome.success)
}

#[async_trait]
impl InfobaseManagementService for GatewayServer {
    async fn create_infobase(
        &self,
        request: Request<CreateInfobaseRequest>,
    ) -> Result<Response<CreateInfobaseResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(CREATE_INFOBASE, RequestView::Message(&proto), async {
                let req = CreateInfobase::try_from(proto.clone()).map_err(invalid_request)?;
                let outcome = self.lifecycle.create_infobase(req, &scope.cancel).await?;
                Ok(CreateInfobaseResponse {
                    name: outcome.name.unwrap_or_default(),
                    infobase_id: outcome.infobase_id,
                    message: outcome.message,
                    success: outcome.success,
                })
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn update_infobase(
        &self,
        request: Request<UpdateInfobaseRequest>,
    ) -> Result<Response<UpdateInfobaseResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(UPDATE_INFOBASE, RequestView::Message(&proto), async {
                let req = UpdateInfobase::try_from(proto.clone()).map_err(invalid_request)?;
                let (infobase_id, message, success) =
                    outcome_parts(self.lifecycle.update_infobase(req, &scope.cancel).await?);
                Ok(UpdateInfobaseResponse {
                    infobase_id,
                    message,
                    success,
                })
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn drop_infobase(
        &self,
        request: Request<DropInfobaseRequest>,
    ) -> Result<Response<DropInfobaseResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(DROP_INFOBASE, RequestView::Message(&proto), async {
                let req = DropInfobase::try_from(proto.clone()).map_err(invalid_request)?;
                let (infobase_id, message, success) =
                    outcome_parts(self.lifecycle.drop_infobase(req, &scope.cancel).await?);
                Ok(DropInfobaseResponse {
                    infobase_id,
                    message,
                    success,
                })
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn lock_infobase(
        &self,
        request: Request<LockInfobaseRequest>,
    ) -> Result<Response<LockInfobaseResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(LOCK_INFOBASE, RequestView::Message(&proto), async {
                let req = LockInfobase::try_from(proto.clone()).map_err(invalid_request)?;
                let (infobase_id, message, success) =
                    outcome_parts(self.lifecycle.lock_infobase(req, &scope.cancel).await?);
                Ok(LockInfobaseResponse {
                    infobase_id,
                    message,
                    success,
                })
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn unlock_infobase(
        &self,
        request: Request<UnlockInfobaseRequest>,
    ) -> Result<Response<UnlockInfobaseResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(UNLOCK_INFOBASE, RequestView::Message(&proto), async {
                let req = UnlockInfobase::from(proto.clone());
                let (infobase_id, message, success) =
                    outcome_parts(self.lifecycle.unlock_infobase(req, &scope.cancel).await?);
                Ok(UnlockInfobaseResponse {
                    infobase_id,
                    message,
                    success,
                })
            })
            .await?;
        Ok(Response::new(response))
    }
}

#[async_trait]
impl SessionsService for GatewayServer {
    async fn terminate_session(
        &self,
        request: Request<TerminateSessionRequest>,
    ) -> Result<Response<TerminateSessionResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        self.interceptors
            .unary(TERMINATE_SESSION, RequestView::Message(&proto), async {
                let req = TerminateSession::from(proto.clone());
                self.sessions.terminate(req, &scope.cancel).await?;
                Ok(TerminateSessionResponse {})
            })
            .await?;
        Ok(Response::new(TerminateSessionResponse {}))
    }
}

#[async_trait]
impl RasQueryService for GatewayServer {
    async fn authenticate_agent(
        &self,
        request: Request<AuthenticateAgentRequest>,
    ) -> Result<Response<AuthenticateResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(AUTHENTICATE_AGENT, RequestView::Message(&proto), async {
                let auth = Authenticate::from(proto.clone());
                self.query.authenticate(auth, &scope.cancel).await?;
                Ok(AuthenticateResponse {})
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn authenticate_cluster(
        &self,
        request: Request<ClusterAuthenticateRequest>,
    ) -> Result<Response<AuthenticateResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(AUTHENTICATE_CLUSTER, RequestView::Message(&proto), async {
                let auth = Authenticate::from(proto.clone());
                self.query.authenticate(auth, &scope.cancel).await?;
                Ok(AuthenticateResponse {})
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn authenticate_infobase(
        &self,
        request: Request<AuthenticateInfobaseRequest>,
    ) -> Result<Response<AuthenticateResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(AUTHENTICATE_INFOBASE, RequestView::Message(&proto), async {
                let auth = Authenticate::from(proto.clone());
                self.query.authenticate(auth, &scope.cancel).await?;
                Ok(AuthenticateResponse {})
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn get_clusters(
        &self,
        request: Request<GetClustersRequest>,
    ) -> Result<Response<GetClustersResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(GET_CLUSTERS, RequestView::Message(&proto), async {
                let clusters = self.query.clusters(&scope.cancel).await?;
                Ok(GetClustersResponse {
                    clusters: clusters.into_iter().map(Into::into).collect(),
                })
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn get_cluster_info(
        &self,
        request: Request<GetClusterInfoRequest>,
    ) -> Result<Response<GetClusterInfoResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(GET_CLUSTER_INFO, RequestView::Message(&proto), async {
                let cluster = self
                    .query
                    .cluster_info(&proto.cluster_id, &scope.cancel)
                    .await?;
                Ok(GetClusterInfoResponse {
                    cluster: Some(cluster.into()),
                })
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn get_sessions(
        &self,
        request: Request<GetSessionsRequest>,
    ) -> Result<Response<GetSessionsResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(GET_SESSIONS, RequestView::Message(&proto), async {
                let sessions = self.query.sessions(&proto.cluster_id, &scope.cancel).await?;
                Ok(GetSessionsResponse {
                    sessions: sessions.into_iter().map(Into::into).collect(),
                })
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn get_short_infobases(
        &self,
        request: Request<GetInfobasesShortRequest>,
    ) -> Result<Response<GetInfobasesShortResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(GET_SHORT_INFOBASES, RequestView::Message(&proto), async {
                let infobases = self
                    .query
                    .infobases(&proto.cluster_id, &scope.cancel)
                    .await?;
                Ok(GetInfobasesShortResponse {
                    infobases: infobases.into_iter().map(Into::into).collect(),
                })
            })
            .await?;
        Ok(Response::new(response))
    }

    async fn get_infobase_sessions(
        &self,
        request: Request<GetInfobaseSessionsRequest>,
    ) -> Result<Response<GetInfobaseSessionsResponse>, Status> {
        let scope = CallScope::for_request(&request);
        let proto = request.into_inner();
        let response = self
            .interceptors
            .unary(GET_INFOBASE_SESSIONS, RequestView::Message(&proto), async {
                let sessions = self
                    .query
                    .infobase_sessions(&proto.cluster_id, &proto.infobase_id, &scope.cancel)
                    .await?;
                Ok(GetInfobaseSessionsResponse {
                    sessions: sessions.into_iter().map(Into::into).collect(),
                })
            })
            .await?;
        Ok(Response::new(response))
    }
}
