use crate::endpoint::{
    Endpoint, EndpointEnvelope, EndpointError, EndpointProvider, EndpointRequest, EndpointResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use ras_config::Configurable;
use ras_error::{ErrorCodes, RasError};
use ras_types::{
    AuthScope, Authenticate, ClusterSummary, InfobaseInfo, InfobaseSummary, SessionInfo,
    SessionSummary,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InMemoryEndpointConfig {
    #[serde(default)]
    pub clusters: Vec<InMemoryClusterConfig>,
    /// Central server administrators. When empty, any agent credentials are
    /// accepted.
    #[serde(default)]
    pub agent_admins: Vec<InMemoryCredential>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InMemoryClusterConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u32>,
    #[serde(default)]
    pub infobases: Vec<InMemoryInfobaseSeed>,
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub admins: Vec<InMemoryCredential>,
    #[serde(default)]
    pub infobase_users: Vec<InMemoryCredential>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InMemoryInfobaseSeed {
    #[serde(default)]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InMemoryCredential {
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for InMemoryCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCredential")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum InMemoryConfigError {
    #[error("cluster {0} is configured more than once")]
    DuplicateCluster(String),
    #[error("infobase {name} is configured more than once in cluster {cluster_id}")]
    DuplicateInfobase { cluster_id: String, name: String },
}

impl RasError for InMemoryConfigError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}

pub const DEFAULT_CLUSTER_HOST: &str = "localhost";
pub const DEFAULT_CLUSTER_PORT: u32 = 1541;

#[derive(Debug)]
struct ClusterState {
    summary: ClusterSummary,
    infobases: Vec<InfobaseInfo>,
    sessions: BTreeMap<String, SessionSummary>,
    admins: Vec<InMemoryCredential>,
    infobase_users: Vec<InMemoryCredential>,
}

impl ClusterState {
    fn new(uuid: &str) -> Self {
        Self {
            summary: ClusterSummary {
                uuid: uuid.to_string(),
                host: DEFAULT_CLUSTER_HOST.to_string(),
                port: DEFAULT_CLUSTER_PORT,
                name: uuid.to_string(),
            },
            infobases: Vec::new(),
            sessions: BTreeMap::new(),
            admins: Vec::new(),
            infobase_users: Vec::new(),
        }
    }

    fn add_session(&mut self, session: SessionSummary) {
        self.sessions.insert(session.uuid.clone(), session);
    }
}

fn unbound_session(uuid: impl Into<String>) -> SessionSummary {
    SessionSummary {
        uuid: uuid.into(),
        ..Default::default()
    }
}

/// An administration service held entirely in memory.
///
/// It answers the same requests a real RAS endpoint does and fails with the
/// same kind of free-form text, so everything above the endpoint seam behaves
/// as it would in production.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRas {
    clusters: Arc<Mutex<HashMap<String, ClusterState>>>,
    agent_admins: Arc<Vec<InMemoryCredential>>,
}

impl InMemoryRas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cluster(&self, cluster_id: impl Into<String>) {
        let cluster_id = cluster_id.into();
        self.clusters
            .lock()
            .entry(cluster_id.clone())
            .or_insert_with(|| ClusterState::new(&cluster_id));
    }

    pub fn add_session(&self, cluster_id: &str, session_id: impl Into<String>) {
        if let Some(cluster) = self.clusters.lock().get_mut(cluster_id) {
            cluster.add_session(unbound_session(session_id));
        }
    }

    pub fn add_infobase_session(&self, cluster_id: &str, session: SessionSummary) {
        if let Some(cluster) = self.clusters.lock().get_mut(cluster_id) {
            cluster.add_session(session);
        }
    }

    pub fn add_cluster_admin(&self, cluster_id: &str, user: &str, password: &str) {
        if let Some(cluster) = self.clusters.lock().get_mut(cluster_id) {
            cluster.admins.push(InMemoryCredential {
                user: user.to_string(),
                password: password.to_string(),
            });
        }
    }

    pub fn infobase(&self, cluster_id: &str, uuid: &str) -> Option<InfobaseInfo> {
        self.clusters.lock().get(cluster_id).and_then(|cluster| {
            cluster
                .infobases
                .iter()
                .find(|ib| ib.uuid.as_deref() == Some(uuid))
                .cloned()
        })
    }

    pub fn infobase_count(&self, cluster_id: &str) -> usize {
        self.clusters
            .lock()
            .get(cluster_id)
            .map(|cluster| cluster.infobases.len())
            .unwrap_or(0)
    }

    pub fn has_session(&self, cluster_id: &str, session_id: &str) -> bool {
        self.clusters
            .lock()
            .get(cluster_id)
            .map(|cluster| cluster.sessions.contains_key(session_id))
            .unwrap_or(false)
    }

    fn handle(&self, request: EndpointRequest) -> Result<EndpointResponse, EndpointError> {
        let mut clusters = self.clusters.lock();
        match request {
            EndpointRequest::Authenticate(auth) => {
                let accepted = match &auth.scope {
                    AuthScope::Agent => self.agent_admins.as_slice(),
                    AuthScope::Cluster { cluster_id } => {
                        cluster_mut(&mut clusters, cluster_id)?.admins.as_slice()
                    }
                    AuthScope::Infobase { cluster_id } => {
                        cluster_mut(&mut clusters, cluster_id)?
                            .infobase_users
                            .as_slice()
                    }
                };
                if !admits(accepted, &auth) {
                    return Err(EndpointError::new(format!(
                        "{} authentication failed: wrong user name or password",
                        auth.scope.name()
                    )));
                }
                Ok(EndpointResponse::Authenticated)
            }
            EndpointRequest::GetClusters => {
                let mut summaries: Vec<ClusterSummary> = clusters
                    .values()
                    .map(|cluster| cluster.summary.clone())
                    .collect();
                summaries.sort_by(|a, b| a.uuid.cmp(&b.uuid));
                Ok(EndpointResponse::Clusters(summaries))
            }
            EndpointRequest::GetClusterInfo { cluster_id } => {
                let cluster = cluster_mut(&mut clusters, &cluster_id)?;
                Ok(EndpointResponse::Cluster(cluster.summary.clone()))
            }
            EndpointRequest::GetSessions { cluster_id } => {
                let cluster = cluster_mut(&mut clusters, &cluster_id)?;
                Ok(EndpointResponse::Sessions(
                    cluster.sessions.values().cloned().collect(),
                ))
            }
            EndpointRequest::GetInfobaseSessions {
                cluster_id,
                infobase_id,
            } => {
                let cluster = cluster_mut(&mut clusters, &cluster_id)?;
                infobase_mut(cluster, Some(infobase_id.as_str()))?;
                Ok(EndpointResponse::Sessions(
                    cluster
                        .sessions
                        .values()
                        .filter(|session| session.infobase_id == infobase_id)
                        .cloned()
                        .collect(),
                ))
            }
            EndpointRequest::GetInfobasesShort { cluster_id } => {
                let cluster = cluster_mut(&mut clusters, &cluster_id)?;
                Ok(EndpointResponse::InfobaseSummaries(
                    cluster.infobases.iter().map(summary).collect(),
                ))
            }
            EndpointRequest::CreateInfobase(mut info) => {
                let cluster = cluster_mut(&mut clusters, &info.cluster_id)?;
                let name = info
                    .name
                    .clone()
                    .ok_or_else(|| EndpointError::new("invalid infobase: name is missing"))?;
                if cluster
                    .infobases
                    .iter()
                    .any(|ib| ib.name.as_deref() == Some(name.as_str()))
                {
                    return Err(EndpointError::new(format!(
                        "infobase {name} already exists"
                    )));
                }
                info.uuid = Some(uuid::Uuid::new_v4().to_string());
                cluster.infobases.push(info.clone());
                Ok(EndpointResponse::Infobase(info))
            }
            EndpointRequest::UpdateInfobase(info) => {
                let cluster = cluster_mut(&mut clusters, &info.cluster_id)?;
                let stored = infobase_mut(cluster, info.uuid.as_deref())?;
                merge(stored, info);
                Ok(EndpointResponse::Infobase(stored.clone()))
            }
            EndpointRequest::UnregisterInfobase(info) => {
                let cluster = cluster_mut(&mut clusters, &info.cluster_id)?;
                let uuid = info.uuid.as_deref();
                let position = cluster
                    .infobases
                    .iter()
                    .position(|ib| ib.uuid.is_some() && ib.uuid.as_deref() == uuid)
                    .ok_or_else(|| infobase_missing(uuid))?;
                Ok(EndpointResponse::Infobase(
                    cluster.infobases.remove(position),
                ))
            }
            EndpointRequest::TerminateSession(session) => {
                let cluster = cluster_mut(&mut clusters, &session.cluster_id)?;
                if cluster.sessions.remove(&session.uuid).is_none() {
                    return Err(EndpointError::new(format!(
                        "session {} not found",
                        session.uuid
                    )));
                }
                Ok(EndpointResponse::Session(session))
            }
        }
    }
}

// An empty list admits anyone, as an unsecured RAS does.
fn admits(accepted: &[InMemoryCredential], auth: &Authenticate) -> bool {
    let user = auth.credentials.user.as_deref().unwrap_or_default();
    let password = auth.credentials.password.as_deref().unwrap_or_default();
    accepted.is_empty()
        || accepted
            .iter()
            .any(|cred| cred.user == user && cred.password == password)
}

fn cluster_mut<'a>(
    clusters: &'a mut HashMap<String, ClusterState>,
    cluster_id: &str,
) -> Result<&'a mut ClusterState, EndpointError> {
    clusters
        .get_mut(cluster_id)
        .ok_or_else(|| EndpointError::new(format!("cluster {cluster_id} not found")))
}

fn infobase_missing(uuid: Option<&str>) -> EndpointError {
    EndpointError::new(format!(
        "infobase {} does not exist",
        uuid.unwrap_or("<none>")
    ))
}

fn infobase_mut<'a>(
    cluster: &'a mut ClusterState,
    uuid: Option<&str>,
) -> Result<&'a mut InfobaseInfo, EndpointError> {
    cluster
        .infobases
        .iter_mut()
        .find(|ib| ib.uuid.is_some() && ib.uuid.as_deref() == uuid)
        .ok_or_else(|| infobase_missing(uuid))
}

fn summary(info: &InfobaseInfo) -> InfobaseSummary {
    InfobaseSummary {
        uuid: info.uuid.clone().unwrap_or_default(),
        name: info.name.clone().unwrap_or_default(),
        description: info.description.clone().unwrap_or_default(),
    }
}

// Present attributes overwrite, absent ones are left alone.
fn merge(stored: &mut InfobaseInfo, patch: InfobaseInfo) {
    fn set<T>(slot: &mut Option<T>, value: Option<T>) {
        if value.is_some() {
            *slot = value;
        }
    }
    set(&mut stored.name, patch.name);
    set(&mut stored.dbms, patch.dbms);
    set(&mut stored.db_server, patch.db_server);
    set(&mut stored.db_name, patch.db_name);
    set(&mut stored.db_user, patch.db_user);
    set(&mut stored.db_password, patch.db_password);
    set(&mut stored.locale, patch.locale);
    set(&mut stored.date_offset, patch.date_offset);
    set(&mut stored.description, patch.description);
    set(&mut stored.security_level, patch.security_level);
    set(&mut stored.sessions_deny, patch.sessions_deny);
    set(&mut stored.scheduled_jobs_deny, patch.scheduled_jobs_deny);
    set(&mut stored.denied_from, patch.denied_from);
    set(&mut stored.denied_to, patch.denied_to);
    set(&mut stored.denied_message, patch.denied_message);
    set(&mut stored.permission_code, patch.permission_code);
    set(&mut stored.license_distribution, patch.license_distribution);
}

#[async_trait]
impl Configurable<InMemoryEndpointConfig> for InMemoryRas {
    async fn try_from_config(
        config: &InMemoryEndpointConfig,
    ) -> Result<Self, Box<dyn RasError>> {
        let mut clusters = HashMap::new();
        for cluster in &config.clusters {
            let mut state = ClusterState::new(&cluster.id);
            if let Some(name) = &cluster.name {
                state.summary.name = name.clone();
            }
            if let Some(host) = &cluster.host {
                state.summary.host = host.clone();
            }
            if let Some(port) = cluster.port {
                state.summary.port = port;
            }
            for seed in &cluster.infobases {
                if state
                    .infobases
                    .iter()
                    .any(|ib| ib.name.as_deref() == Some(seed.name.as_str()))
                {
                    return Err(InMemoryConfigError::DuplicateInfobase {
                        cluster_id: cluster.id.clone(),
                        name: seed.name.clone(),
                    }
                    .boxed());
                }
                state.infobases.push(InfobaseInfo {
                    cluster_id: cluster.id.clone(),
                    uuid: Some(
                        seed.uuid
                            .clone()
                            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                    ),
                    name: Some(seed.name.clone()),
                    description: seed.description.clone(),
                    ..Default::default()
                });
            }
            for session in &cluster.sessions {
                state.add_session(unbound_session(session.clone()));
            }
            state.admins = cluster.admins.clone();
            state.infobase_users = cluster.infobase_users.clone();
            if clusters.insert(cluster.id.clone(), state).is_some() {
                return Err(InMemoryConfigError::DuplicateCluster(cluster.id.clone()).boxed());
            }
        }
        tracing::info!(clusters = clusters.len(), "in-memory RAS endpoint ready");
        Ok(Self {
            clusters: Arc::new(Mutex::new(clusters)),
            agent_admins: Arc::new(config.agent_admins.clone()),
        })
    }
}

#[async_trait]
impl EndpointProvider for InMemoryRas {
    async fn acquire(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Arc<dyn Endpoint>, EndpointError> {
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Endpoint for InMemoryRas {
    #[tracing::instrument(skip_all, fields(request = envelope.request.name()))]
    async fn send(
        &self,
        envelope: EndpointEnvelope,
        _cancel: &CancellationToken,
    ) -> Result<EndpointResponse, EndpointError> {
        let result = self.handle(envelope.request);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "in-memory RAS rejected request");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::ResponseKind;

    async fn seeded() -> InMemoryRas {
        InMemoryRas::try_from_config(&InMemoryEndpointConfig {
            clusters: vec![InMemoryClusterConfig {
                id: "c1".to_string(),
                infobases: vec![InMemoryInfobaseSeed {
                    uuid: Some("ib-seeded".to_string()),
                    name: "accounting".to_string(),
                    description: Some("books".to_string()),
                }],
                sessions: vec!["s1".to_string()],
                name: Some("Main cluster".to_string()),
                port: Some(1545),
                admins: vec![InMemoryCredential {
                    user: "admin".to_string(),
                    password: "cluster-secret".to_string(),
                }],
                ..Default::default()
            }],
            ..Default::default()
        })
        .await
        .unwrap()
    }

    async fn send(ras: &InMemoryRas, envelope: EndpointEnvelope) -> Result<EndpointResponse, EndpointError> {
        let cancel = CancellationToken::new();
        let endpoint = ras.acquire(&cancel).await.unwrap();
        endpoint.send(envelope, &cancel).await
    }

    #[tokio::test]
    async fn test_list_returns_seeded_infobases() {
        let ras = seeded().await;
        let response = send(&ras, EndpointEnvelope::get_infobases_short("c1"))
            .await
            .unwrap();
        assert_eq!(response.kind(), ResponseKind::InfobaseSummaries);
        assert_eq!(
            response,
            EndpointResponse::InfobaseSummaries(vec![InfobaseSummary {
                uuid: "ib-seeded".to_string(),
                name: "accounting".to_string(),
                description: "books".to_string(),
            }])
        );
    }

    #[tokio::test]
    async fn test_unknown_cluster_is_reported_as_not_found_text() {
        let ras = seeded().await;
        let err = send(&ras, EndpointEnvelope::get_infobases_short("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "cluster nope not found");
    }

    #[tokio::test]
    async fn test_create_assigns_uuid_and_rejects_duplicates() {
        let ras = seeded().await;
        let info = InfobaseInfo {
            cluster_id: "c1".to_string(),
            name: Some("payroll".to_string()),
            ..Default::default()
        };
        let EndpointResponse::Infobase(created) =
            send(&ras, EndpointEnvelope::create_infobase(info.clone()))
                .await
                .unwrap()
        else {
            panic!("expected an infobase response");
        };
        assert!(created.uuid.is_some());
        assert_eq!(ras.infobase_count("c1"), 2);

        let err = send(&ras, EndpointEnvelope::create_infobase(info))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_update_merges_present_fields_only() {
        let ras = seeded().await;
        send(
            &ras,
            EndpointEnvelope::update_infobase(InfobaseInfo {
                cluster_id: "c1".to_string(),
                uuid: Some("ib-seeded".to_string()),
                sessions_deny: Some(true),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let stored = ras.infobase("c1", "ib-seeded").unwrap();
        assert_eq!(stored.sessions_deny, Some(true));
        assert_eq!(stored.name.as_deref(), Some("accounting"));
        assert_eq!(stored.description.as_deref(), Some("books"));
    }

    #[tokio::test]
    async fn test_unregister_and_terminate() {
        let ras = seeded().await;
        let info = InfobaseInfo {
            cluster_id: "c1".to_string(),
            uuid: Some("ib-seeded".to_string()),
            ..Default::default()
        };
        send(&ras, EndpointEnvelope::unregister_infobase(info.clone()))
            .await
            .unwrap();
        assert_eq!(ras.infobase_count("c1"), 0);
        let err = send(&ras, EndpointEnvelope::unregister_infobase(info))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "infobase ib-seeded does not exist");

        let session = SessionInfo {
            cluster_id: "c1".to_string(),
            uuid: "s1".to_string(),
        };
        send(&ras, EndpointEnvelope::terminate_session(session.clone()))
            .await
            .unwrap();
        assert!(!ras.has_session("c1", "s1"));
        let err = send(&ras, EndpointEnvelope::terminate_session(session))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "session s1 not found");
    }

    #[tokio::test]
    async fn test_duplicate_cluster_config_is_rejected() {
        let cluster = InMemoryClusterConfig {
            id: "c1".to_string(),
            ..Default::default()
        };
        let err = InMemoryRas::try_from_config(&InMemoryEndpointConfig {
            clusters: vec![cluster.clone(), cluster],
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCodes::InvalidArgument);
    }

    #[tokio::test]
    async fn test_cluster_listing_uses_configured_address() {
        let ras = seeded().await;
        ras.add_cluster("c0");
        let response = send(&ras, EndpointEnvelope::get_clusters()).await.unwrap();
        let EndpointResponse::Clusters(clusters) = response else {
            panic!("expected a cluster listing");
        };
        assert_eq!(
            clusters.iter().map(|c| c.uuid.as_str()).collect::<Vec<_>>(),
            vec!["c0", "c1"]
        );
        assert_eq!(clusters[0].host, DEFAULT_CLUSTER_HOST);
        assert_eq!(clusters[0].port, DEFAULT_CLUSTER_PORT);

        let response = send(&ras, EndpointEnvelope::get_cluster_info("c1"))
            .await
            .unwrap();
        assert_eq!(
            response,
            EndpointResponse::Cluster(ClusterSummary {
                uuid: "c1".to_string(),
                host: DEFAULT_CLUSTER_HOST.to_string(),
                port: 1545,
                name: "Main cluster".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_infobase_sessions_are_filtered_by_infobase() {
        let ras = seeded().await;
        ras.add_infobase_session(
            "c1",
            SessionSummary {
                uuid: "s2".to_string(),
                infobase_id: "ib-seeded".to_string(),
                user_name: "clerk".to_string(),
                app_id: "1CV8C".to_string(),
            },
        );

        let EndpointResponse::Sessions(all) = send(&ras, EndpointEnvelope::get_sessions("c1"))
            .await
            .unwrap()
        else {
            panic!("expected sessions");
        };
        assert_eq!(all.len(), 2);

        let EndpointResponse::Sessions(bound) =
            send(&ras, EndpointEnvelope::get_infobase_sessions("c1", "ib-seeded"))
                .await
                .unwrap()
        else {
            panic!("expected sessions");
        };
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].user_name, "clerk");

        let err = send(&ras, EndpointEnvelope::get_infobase_sessions("c1", "ib-missing"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "infobase ib-missing does not exist");
    }

    fn auth(scope: AuthScope, user: &str, password: &str) -> Authenticate {
        Authenticate {
            scope,
            credentials: ras_types::ClusterCredentials {
                user: Some(user.to_string()),
                password: Some(password.to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_authentication_checks_configured_credentials() {
        let ras = seeded().await;
        let cluster = || AuthScope::Cluster {
            cluster_id: "c1".to_string(),
        };

        let response = send(
            &ras,
            EndpointEnvelope::authenticate(auth(cluster(), "admin", "cluster-secret")),
        )
        .await
        .unwrap();
        assert_eq!(response.kind(), ResponseKind::Authenticated);

        let err = send(
            &ras,
            EndpointEnvelope::authenticate(auth(cluster(), "admin", "wrong")),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cluster authentication failed: wrong user name or password"
        );

        // Nothing configured for the agent or for infobase users.
        for scope in [
            AuthScope::Agent,
            AuthScope::Infobase {
                cluster_id: "c1".to_string(),
            },
        ] {
            send(&ras, EndpointEnvelope::authenticate(auth(scope, "anyone", "")))
                .await
                .unwrap();
        }

        let err = send(
            &ras,
            EndpointEnvelope::authenticate(auth(
                AuthScope::Cluster {
                    cluster_id: "nope".to_string(),
                },
                "admin",
                "cluster-secret",
            )),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "cluster nope not found");
    }

    #[test]
    fn test_credential_debug_hides_password() {
        let credential = InMemoryCredential {
            user: "admin".to_string(),
            password: "cluster-secret".to_string(),
        };
        let printed = format!("{credential:?}");
        assert!(printed.contains("admin"));
        assert!(!printed.contains("cluster-secret"));
    }
}
