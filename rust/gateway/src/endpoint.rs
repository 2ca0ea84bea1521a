//! The seam between the gateway and the administration service.
//!
//! An [`EndpointProvider`] hands out authenticated channels; an [`Endpoint`]
//! carries one typed request and returns one typed response. Failures are
//! opaque text and must go through [`ras_error::map_endpoint_error`] before
//! they reach a caller.

use crate::in_memory::{InMemoryEndpointConfig, InMemoryRas};
use async_trait::async_trait;
use ras_config::Configurable;
use ras_error::RasError;
use ras_types::{
    Authenticate, ClusterSummary, InfobaseInfo, InfobaseSummary, SessionInfo, SessionSummary,
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, PartialEq)]
pub enum EndpointRequest {
    Authenticate(Authenticate),
    GetClusters,
    GetClusterInfo { cluster_id: String },
    GetSessions { cluster_id: String },
    GetInfobaseSessions { cluster_id: String, infobase_id: String },
    GetInfobasesShort { cluster_id: String },
    CreateInfobase(InfobaseInfo),
    UpdateInfobase(InfobaseInfo),
    UnregisterInfobase(InfobaseInfo),
    TerminateSession(SessionInfo),
}

impl EndpointRequest {
    pub fn name(&self) -> &'static str {
        match self {
            EndpointRequest::Authenticate(_) => "Authenticate",
            EndpointRequest::GetClusters => "GetClusters",
            EndpointRequest::GetClusterInfo { .. } => "GetClusterInfo",
            EndpointRequest::GetSessions { .. } => "GetSessions",
            EndpointRequest::GetInfobaseSessions { .. } => "GetInfobaseSessions",
            EndpointRequest::GetInfobasesShort { .. } => "GetInfobasesShort",
            EndpointRequest::CreateInfobase(_) => "CreateInfobase",
            EndpointRequest::UpdateInfobase(_) => "UpdateInfobase",
            EndpointRequest::UnregisterInfobase(_) => "UnregisterInfobase",
            EndpointRequest::TerminateSession(_) => "TerminateSession",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    Authenticated,
    Clusters,
    Cluster,
    Sessions,
    InfobaseSummaries,
    Infobase,
    Session,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EndpointResponse {
    Authenticated,
    Clusters(Vec<ClusterSummary>),
    Cluster(ClusterSummary),
    Sessions(Vec<SessionSummary>),
    InfobaseSummaries(Vec<InfobaseSummary>),
    Infobase(InfobaseInfo),
    Session(SessionInfo),
}

impl EndpointResponse {
    pub fn kind(&self) -> ResponseKind {
        match self {
            EndpointResponse::Authenticated => ResponseKind::Authenticated,
            EndpointResponse::Clusters(_) => ResponseKind::Clusters,
            EndpointResponse::Cluster(_) => ResponseKind::Cluster,
            EndpointResponse::Sessions(_) => ResponseKind::Sessions,
            EndpointResponse::InfobaseSummaries(_) => ResponseKind::InfobaseSummaries,
            EndpointResponse::Infobase(_) => ResponseKind::Infobase,
            EndpointResponse::Session(_) => ResponseKind::Session,
        }
    }
}

/// A request together with the response kind the caller expects back.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointEnvelope {
    pub request: EndpointRequest,
    pub respond: ResponseKind,
}

impl EndpointEnvelope {
    pub fn authenticate(auth: Authenticate) -> Self {
        Self {
            request: EndpointRequest::Authenticate(auth),
            respond: ResponseKind::Authenticated,
        }
    }

    pub fn get_clusters() -> Self {
        Self {
            request: EndpointRequest::GetClusters,
            respond: ResponseKind::Clusters,
        }
    }

    pub fn get_cluster_info(cluster_id: impl Into<String>) -> Self {
        Self {
            request: EndpointRequest::GetClusterInfo {
                cluster_id: cluster_id.into(),
            },
            respond: ResponseKind::Cluster,
        }
    }

    pub fn get_sessions(cluster_id: impl Into<String>) -> Self {
        Self {
            request: EndpointRequest::GetSessions {
                cluster_id: cluster_id.into(),
            },
            respond: ResponseKind::Sessions,
        }
    }

    pub fn get_infobase_sessions(
        cluster_id: impl Into<String>,
        infobase_id: impl Into<String>,
    ) -> Self {
        Self {
            request: EndpointRequest::GetInfobaseSessions {
                cluster_id: cluster_id.into(),
                infobase_id: infobase_id.into(),
            },
            respond: ResponseKind::Sessions,
        }
    }

    pub fn get_infobases_short(cluster_id: impl Into<String>) -> Self {
        Self {
            request: EndpointRequest::GetInfobasesShort {
                cluster_id: cluster_id.into(),
            },
            respond: ResponseKind::InfobaseSummaries,
        }
    }

    pub fn create_infobase(info: InfobaseInfo) -> Self {
        Self {
            request: EndpointRequest::CreateInfobase(info),
            respond: ResponseKind::Infobase,
        }
    }

    pub fn update_infobase(info: InfobaseInfo) -> Self {
        Self {
            request: EndpointRequest::UpdateInfobase(info),
            respond: ResponseKind::Infobase,
        }
    }

    pub fn unregister_infobase(info: InfobaseInfo) -> Self {
        Self {
            request: EndpointRequest::UnregisterInfobase(info),
            respond: ResponseKind::Infobase,
        }
    }

    pub fn terminate_session(session: SessionInfo) -> Self {
        Self {
            request: EndpointRequest::TerminateSession(session),
            respond: ResponseKind::Session,
        }
    }
}

/// A failure reported by the administration service. Only the text is
/// meaningful.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct EndpointError {
    message: String,
}

impl EndpointError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Endpoint: Send + Sync + Debug {
    async fn send(
        &self,
        envelope: EndpointEnvelope,
        cancel: &CancellationToken,
    ) -> Result<EndpointResponse, EndpointError>;
}

#[async_trait]
pub trait EndpointProvider: Send + Sync + Debug {
    async fn acquire(&self, cancel: &CancellationToken) -> Result<Arc<dyn Endpoint>, EndpointError>;
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum EndpointConfig {
    InMemory(InMemoryEndpointConfig),
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig::InMemory(InMemoryEndpointConfig::default())
    }
}

pub async fn from_config(
    config: &EndpointConfig,
) -> Result<Arc<dyn EndpointProvider>, Box<dyn RasError>> {
    match config {
        EndpointConfig::InMemory(in_memory) => {
            let provider = InMemoryRas::try_from_config(in_memory).await?;
            Ok(Arc::new(provider))
        }
    }
}
