use crate::requests::{redacted, ClusterCredentials};
use crate::ras_proto;

/// One cluster registered with the administration service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterSummary {
    pub uuid: String,
    pub host: String,
    pub port: u32,
    pub name: String,
}

/// One session open against a cluster. `infobase_id` is empty for sessions
/// not bound to an infobase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub uuid: String,
    pub infobase_id: String,
    pub user_name: String,
    pub app_id: String,
}

/// Who a set of credentials is checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthScope {
    Agent,
    Cluster { cluster_id: String },
    Infobase { cluster_id: String },
}

impl AuthScope {
    pub fn cluster_id(&self) -> Option<&str> {
        match self {
            AuthScope::Agent => None,
            AuthScope::Cluster { cluster_id } | AuthScope::Infobase { cluster_id } => {
                Some(cluster_id)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthScope::Agent => "agent",
            AuthScope::Cluster { .. } => "cluster",
            AuthScope::Infobase { .. } => "infobase",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Authenticate {
    pub scope: AuthScope,
    pub credentials: ClusterCredentials,
}

impl std::fmt::Debug for Authenticate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticate")
            .field("scope", &self.scope)
            .field("user", &self.credentials.user)
            .field("password", &redacted(&self.credentials.password))
            .finish()
    }
}

fn credentials(user: String, password: String) -> ClusterCredentials {
    ClusterCredentials {
        user: Some(user),
        password: Some(password),
    }
}

impl From<ras_proto::AuthenticateAgentRequest> for Authenticate {
    fn from(req: ras_proto::AuthenticateAgentRequest) -> Self {
        Authenticate {
            scope: AuthScope::Agent,
            credentials: credentials(req.user, req.password),
        }
    }
}

impl From<ras_proto::ClusterAuthenticateRequest> for Authenticate {
    fn from(req: ras_proto::ClusterAuthenticateRequest) -> Self {
        Authenticate {
            scope: AuthScope::Cluster {
                cluster_id: req.cluster_id,
            },
            credentials: credentials(req.user, req.password),
        }
    }
}

impl From<ras_proto::AuthenticateInfobaseRequest> for Authenticate {
    fn from(req: ras_proto::AuthenticateInfobaseRequest) -> Self {
        Authenticate {
            scope: AuthScope::Infobase {
                cluster_id: req.cluster_id,
            },
            credentials: credentials(req.user, req.password),
        }
    }
}

impl From<ClusterSummary> for ras_proto::ClusterInfo {
    fn from(cluster: ClusterSummary) -> Self {
        ras_proto::ClusterInfo {
            uuid: cluster.uuid,
            host: cluster.host,
            port: cluster.port,
            name: cluster.name,
        }
    }
}

impl From<SessionSummary> for ras_proto::SessionInfo {
    fn from(session: SessionSummary) -> Self {
        ras_proto::SessionInfo {
            uuid: session.uuid,
            infobase_id: session.infobase_id,
            user_name: session.user_name,
            app_id: session.app_id,
        }
    }
}

impl From<crate::InfobaseSummary> for ras_proto::InfobaseShort {
    fn from(summary: crate::InfobaseSummary) -> Self {
        ras_proto::InfobaseShort {
            uuid: summary.uuid,
            name: summary.name,
            description: summary.description,
        }
    }
}
