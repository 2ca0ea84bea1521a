use crate::requests::{redacted, CreateInfobase, DbmsKind, UpdateInfobase};
use chrono::{DateTime, Utc};

/// License distribution flag as encoded by the administration protocol.
pub const LICENSE_DISTRIBUTION_ALLOW: u32 = 0;
pub const LICENSE_DISTRIBUTION_DENY: u32 = 1;

pub fn license_distribution_code(allow: bool) -> u32 {
    if allow {
        LICENSE_DISTRIBUTION_ALLOW
    } else {
        LICENSE_DISTRIBUTION_DENY
    }
}

/// The infobase record exchanged with the administration endpoint.
///
/// Every attribute except the cluster id is optional. A record built from an
/// update request only carries the attributes the caller asked to change, so
/// the endpoint never sees implicit zero values. `uuid` is set for update and
/// unregister, never for create.
#[derive(Clone, Default, PartialEq)]
pub struct InfobaseInfo {
    pub cluster_id: String,
    pub uuid: Option<String>,
    pub name: Option<String>,
    pub dbms: Option<DbmsKind>,
    pub db_server: Option<String>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub locale: Option<String>,
    pub date_offset: Option<i32>,
    pub description: Option<String>,
    pub security_level: Option<u32>,
    pub sessions_deny: Option<bool>,
    pub scheduled_jobs_deny: Option<bool>,
    pub denied_from: Option<DateTime<Utc>>,
    pub denied_to: Option<DateTime<Utc>>,
    pub denied_message: Option<String>,
    pub permission_code: Option<String>,
    pub license_distribution: Option<u32>,
}

impl std::fmt::Debug for InfobaseInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfobaseInfo")
            .field("cluster_id", &self.cluster_id)
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("dbms", &self.dbms)
            .field("db_server", &self.db_server)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_password", &redacted(&self.db_password))
            .field("locale", &self.locale)
            .field("date_offset", &self.date_offset)
            .field("description", &self.description)
            .field("security_level", &self.security_level)
            .field("sessions_deny", &self.sessions_deny)
            .field("scheduled_jobs_deny", &self.scheduled_jobs_deny)
            .field("denied_from", &self.denied_from)
            .field("denied_to", &self.denied_to)
            .field("denied_message", &self.denied_message)
            .field("permission_code", &self.permission_code)
            .field("license_distribution", &self.license_distribution)
            .finish()
    }
}

impl From<&CreateInfobase> for InfobaseInfo {
    fn from(req: &CreateInfobase) -> Self {
        InfobaseInfo {
            cluster_id: req.cluster_id.clone(),
            uuid: None,
            name: Some(req.name.clone()),
            dbms: req.dbms,
            db_server: Some(req.db_server.clone()),
            db_name: Some(req.db_name.clone()),
            db_user: req.db_user.clone(),
            db_password: req.db_password.clone(),
            locale: req.locale.clone(),
            date_offset: req.date_offset,
            description: req.description.clone(),
            security_level: req.security_level,
            scheduled_jobs_deny: req.scheduled_jobs_deny,
            license_distribution: req.license_distribution_allow.map(license_distribution_code),
            ..Default::default()
        }
    }
}

impl From<&UpdateInfobase> for InfobaseInfo {
    fn from(req: &UpdateInfobase) -> Self {
        InfobaseInfo {
            cluster_id: req.cluster_id.clone(),
            uuid: Some(req.infobase_id.clone()),
            name: None,
            dbms: req.dbms,
            db_server: req.db_server.clone(),
            db_name: req.db_name.clone(),
            db_user: req.db_user.clone(),
            db_password: req.db_password.clone(),
            locale: req.locale.clone(),
            date_offset: req.date_offset,
            description: req.description.clone(),
            security_level: req.security_level,
            sessions_deny: req.sessions_deny,
            scheduled_jobs_deny: req.scheduled_jobs_deny,
            denied_from: req.denied_from,
            denied_to: req.denied_to,
            denied_message: req.denied_message.clone(),
            permission_code: req.permission_code.clone(),
            license_distribution: req.license_distribution_allow.map(license_distribution_code),
        }
    }
}

/// One entry of the short infobase listing of a cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InfobaseSummary {
    pub uuid: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub cluster_id: String,
    pub uuid: String,
}
