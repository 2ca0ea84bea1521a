use crate::ras_proto;
use chrono::{DateTime, Utc};
use ras_error::{ErrorCodes, RasError};
use thiserror::Error;

/// Database engines an infobase can be hosted on. All of them are server
/// based; file infobases cannot be created through the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DbmsKind {
    MssqlServer,
    PostgreSql,
    IbmDb2,
    OracleDatabase,
}

impl DbmsKind {
    /// The name used by the administration protocol.
    pub fn wire_name(&self) -> &'static str {
        match self {
            DbmsKind::MssqlServer => "MSSQLServer",
            DbmsKind::PostgreSql => "PostgreSQL",
            DbmsKind::IbmDb2 => "IBMDB2",
            DbmsKind::OracleDatabase => "OracleDatabase",
        }
    }
}

impl std::fmt::Display for DbmsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropMode {
    UnregisterOnly,
    DropDatabase,
    ClearDatabase,
}

impl DropMode {
    pub fn proto_name(&self) -> &'static str {
        match self {
            DropMode::UnregisterOnly => "DROP_MODE_UNREGISTER_ONLY",
            DropMode::DropDatabase => "DROP_MODE_DROP_DATABASE",
            DropMode::ClearDatabase => "DROP_MODE_CLEAR_DATABASE",
        }
    }
}

impl std::fmt::Display for DropMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.proto_name())
    }
}

pub(crate) fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "******")
}

/// The acting cluster administrator. The password is never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClusterCredentials {
    pub user: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct CreateInfobase {
    pub cluster_id: String,
    pub name: String,
    pub dbms: Option<DbmsKind>,
    pub db_server: String,
    pub db_name: String,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub locale: Option<String>,
    pub date_offset: Option<i32>,
    pub description: Option<String>,
    pub security_level: Option<u32>,
    pub scheduled_jobs_deny: Option<bool>,
    pub license_distribution_allow: Option<bool>,
    pub credentials: ClusterCredentials,
}

/// A partial update. `None` leaves the attribute untouched; `Some` sets it,
/// including to `false`, `0` or the empty string.
#[derive(Clone, Default, PartialEq)]
pub struct UpdateInfobase {
    pub cluster_id: String,
    pub infobase_id: String,
    pub sessions_deny: Option<bool>,
    pub scheduled_jobs_deny: Option<bool>,
    pub denied_message: Option<String>,
    pub denied_from: Option<DateTime<Utc>>,
    pub denied_to: Option<DateTime<Utc>>,
    pub permission_code: Option<String>,
    pub dbms: Option<DbmsKind>,
    pub db_server: Option<String>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub description: Option<String>,
    pub security_level: Option<u32>,
    pub locale: Option<String>,
    pub date_offset: Option<i32>,
    pub license_distribution_allow: Option<bool>,
    pub credentials: ClusterCredentials,
}

impl std::fmt::Debug for CreateInfobase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateInfobase")
            .field("cluster_id", &self.cluster_id)
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
            .field("scheduled_jobs_deny", &self.scheduled_jobs_deny)
            .field("license_distribution_allow", &self.license_distribution_allow)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl std::fmt::Debug for UpdateInfobase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateInfobase")
            .field("cluster_id", &self.cluster_id)
            .field("infobase_id", &self.infobase_id)
            .field("sessions_deny", &self.sessions_deny)
            .field("scheduled_jobs_deny", &self.scheduled_jobs_deny)
            .field("denied_message", &self.denied_message)
            .field("denied_from", &self.denied_from)
            .field("denied_to", &self.denied_to)
            .field("permission_code", &self.permission_code)
            .field("dbms", &self.dbms)
            .field("db_server", &self.db_server)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_password", &redacted(&self.db_password))
            .field("description", &self.description)
            .field("security_level", &self.security_level)
            .field("locale", &self.locale)
            .field("date_offset", &self.date_offset)
            .field("license_distribution_allow", &self.license_distribution_allow)
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DropInfobase {
    pub cluster_id: String,
    pub infobase_id: String,
    pub drop_mode: Option<DropMode>,
    pub credentials: ClusterCredentials,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LockInfobase {
    pub cluster_id: String,
    pub infobase_id: String,
    pub sessions_deny: bool,
    pub scheduled_jobs_deny: bool,
    pub denied_from: Option<DateTime<Utc>>,
    pub denied_to: Option<DateTime<Utc>>,
    pub denied_message: Option<String>,
    pub permission_code: Option<String>,
    pub credentials: ClusterCredentials,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnlockInfobase {
    pub cluster_id: String,
    pub infobase_id: String,
    pub unlock_sessions: bool,
    pub unlock_scheduled_jobs: bool,
    pub credentials: ClusterCredentials,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminateSession {
    pub cluster_id: String,
    pub session_id: String,
}

impl From<LockInfobase> for UpdateInfobase {
    /// Only the requested restrictions are forwarded. A `false` request flag
    /// leaves the corresponding attribute untouched rather than clearing it.
    fn from(lock: LockInfobase) -> Self {
        let mut update = UpdateInfobase {
            cluster_id: lock.cluster_id,
            infobase_id: lock.infobase_id,
            credentials: lock.credentials,
            ..Default::default()
        };
        if lock.sessions_deny {
            update.sessions_deny = Some(true);
            update.denied_from = lock.denied_from;
            update.denied_to = lock.denied_to;
            update.denied_message = lock.denied_message;
            update.permission_code = lock.permission_code;
        }
        if lock.scheduled_jobs_deny {
            update.scheduled_jobs_deny = Some(true);
        }
        update
    }
}

impl From<UnlockInfobase> for UpdateInfobase {
    fn from(unlock: UnlockInfobase) -> Self {
        let mut update = UpdateInfobase {
            cluster_id: unlock.cluster_id,
            infobase_id: unlock.infobase_id,
            credentials: unlock.credentials,
            ..Default::default()
        };
        if unlock.unlock_sessions {
            update.sessions_deny = Some(false);
            update.permission_code = Some(String::new());
        }
        if unlock.unlock_scheduled_jobs {
            update.scheduled_jobs_deny = Some(false);
        }
        update
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestConversionError {
    #[error("{field}: unknown enum value {value}")]
    UnknownEnumValue { field: &'static str, value: i32 },
    #[error("{0} must not be unspecified when present")]
    UnspecifiedEnum(&'static str),
    #[error("{0}: timestamp is out of range")]
    InvalidTimestamp(&'static str),
}

impl RasError for RequestConversionError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}

fn dbms_kind(field: &'static str, value: i32) -> Result<Option<DbmsKind>, RequestConversionError> {
    match ras_proto::DbmsType::try_from(value) {
        Ok(ras_proto::DbmsType::Unspecified) => Ok(None),
        Ok(ras_proto::DbmsType::MssqlServer) => Ok(Some(DbmsKind::MssqlServer)),
        Ok(ras_proto::DbmsType::Postgresql) => Ok(Some(DbmsKind::PostgreSql)),
        Ok(ras_proto::DbmsType::IbmDb2) => Ok(Some(DbmsKind::IbmDb2)),
        Ok(ras_proto::DbmsType::Oracle) => Ok(Some(DbmsKind::OracleDatabase)),
        Err(_) => Err(RequestConversionError::UnknownEnumValue { field, value }),
    }
}

// An explicitly sent but unspecified kind is a caller mistake on update.
fn optional_dbms_kind(
    field: &'static str,
    value: Option<i32>,
) -> Result<Option<DbmsKind>, RequestConversionError> {
    match value {
        None => Ok(None),
        Some(value) => match dbms_kind(field, value)? {
            Some(kind) => Ok(Some(kind)),
            None => Err(RequestConversionError::UnspecifiedEnum(field)),
        },
    }
}

// Maps to the numeric level 0-3 used on the wire; unspecified means level 0.
fn security_level(
    field: &'static str,
    value: Option<i32>,
) -> Result<Option<u32>, RequestConversionError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let level = match ras_proto::SecurityLevel::try_from(value) {
        Ok(ras_proto::SecurityLevel::Unspecified) | Ok(ras_proto::SecurityLevel::Level0) => 0,
        Ok(ras_proto::SecurityLevel::Level1) => 1,
        Ok(ras_proto::SecurityLevel::Level2) => 2,
        Ok(ras_proto::SecurityLevel::Level3) => 3,
        Err(_) => return Err(RequestConversionError::UnknownEnumValue { field, value }),
    };
    Ok(Some(level))
}

fn drop_mode(value: i32) -> Result<Option<DropMode>, RequestConversionError> {
    match ras_proto::DropMode::try_from(value) {
        Ok(ras_proto::DropMode::Unspecified) => Ok(None),
        Ok(ras_proto::DropMode::UnregisterOnly) => Ok(Some(DropMode::UnregisterOnly)),
        Ok(ras_proto::DropMode::DropDatabase) => Ok(Some(DropMode::DropDatabase)),
        Ok(ras_proto::DropMode::ClearDatabase) => Ok(Some(DropMode::ClearDatabase)),
        Err(_) => Err(RequestConversionError::UnknownEnumValue {
            field: "drop_mode",
            value,
        }),
    }
}

fn timestamp(
    field: &'static str,
    value: Option<prost_types::Timestamp>,
) -> Result<Option<DateTime<Utc>>, RequestConversionError> {
    let Some(ts) = value else {
        return Ok(None);
    };
    let nanos =
        u32::try_from(ts.nanos).map_err(|_| RequestConversionError::InvalidTimestamp(field))?;
    DateTime::from_timestamp(ts.seconds, nanos)
        .map(Some)
        .ok_or(RequestConversionError::InvalidTimestamp(field))
}

impl TryFrom<ras_proto::CreateInfobaseRequest> for CreateInfobase {
    type Error = RequestConversionError;

    fn try_from(req: ras_proto::CreateInfobaseRequest) -> Result<Self, Self::Error> {
        Ok(CreateInfobase {
            dbms: dbms_kind("dbms", req.dbms)?,
            security_level: security_level("security_level", req.security_level)?,
            cluster_id: req.cluster_id,
            name: req.name,
            db_server: req.db_server,
            db_name: req.db_name,
            db_user: req.db_user,
            db_password: req.db_password,
            locale: req.locale,
            date_offset: req.date_offset,
            description: req.description,
            scheduled_jobs_deny: req.scheduled_jobs_deny,
            license_distribution_allow: req.license_distribution_allow,
            credentials: ClusterCredentials {
                user: req.cluster_user,
                password: req.cluster_password,
            },
        })
    }
}

impl TryFrom<ras_proto::UpdateInfobaseRequest> for UpdateInfobase {
    type Error = RequestConversionError;

    fn try_from(req: ras_proto::UpdateInfobaseRequest) -> Result<Self, Self::Error> {
        Ok(UpdateInfobase {
            dbms: optional_dbms_kind("dbms", req.dbms)?,
            security_level: security_level("security_level", req.security_level)?,
            denied_from: timestamp("denied_from", req.denied_from)?,
            denied_to: timestamp("denied_to", req.denied_to)?,
            cluster_id: req.cluster_id,
            infobase_id: req.infobase_id,
            sessions_deny: req.sessions_deny,
            scheduled_jobs_deny: req.scheduled_jobs_deny,
            denied_message: req.denied_message,
            permission_code: req.permission_code,
            db_server: req.db_server,
            db_name: req.db_name,
            db_user: req.db_user,
            db_password: req.db_password,
            description: req.description,
            locale: req.locale,
            date_offset: req.date_offset,
            license_distribution_allow: req.license_distribution_allow,
            credentials: ClusterCredentials {
                user: req.cluster_user,
                password: req.cluster_password,
            },
        })
    }
}

impl TryFrom<ras_proto::DropInfobaseRequest> for DropInfobase {
    type Error = RequestConversionError;

    fn try_from(req: ras_proto::DropInfobaseRequest) -> Result<Self, Self::Error> {
        Ok(DropInfobase {
            drop_mode: drop_mode(req.drop_mode)?,
            cluster_id: req.cluster_id,
            infobase_id: req.infobase_id,
            credentials: ClusterCredentials {
                user: req.cluster_user,
                password: req.cluster_password,
            },
        })
    }
}

impl TryFrom<ras_proto::LockInfobaseRequest> for LockInfobase {
    type Error = RequestConversionError;

    fn try_from(req: ras_proto::LockInfobaseRequest) -> Result<Self, Self::Error> {
        Ok(LockInfobase {
            denied_from: timestamp("denied_from", req.denied_from)?,
            denied_to: timestamp("denied_to", req.denied_to)?,
            cluster_id: req.cluster_id,
            infobase_id: req.infobase_id,
            sessions_deny: req.sessions_deny,
            scheduled_jobs_deny: req.scheduled_jobs_deny,
            denied_message: req.denied_message,
            permission_code: req.permission_code,
            credentials: ClusterCredentials {
                user: req.cluster_user,
                password: req.cluster_password,
            },
        })
    }
}

impl From<ras_proto::UnlockInfobaseRequest> for UnlockInfobase {
    fn from(req: ras_proto::UnlockInfobaseRequest) -> Self {
        UnlockInfobase {
            cluster_id: req.cluster_id,
            infobase_id: req.infobase_id,
            unlock_sessions: req.unlock_sessions,
            unlock_scheduled_jobs: req.unlock_scheduled_jobs,
            credentials: ClusterCredentials {
                user: req.cluster_user,
                password: req.cluster_password,
            },
        }
    }
}

impl From<ras_proto::TerminateSessionRequest> for TerminateSession {
    fn from(req: ras_proto::TerminateSessionRequest) -> Self {
        TerminateSession {
            cluster_id: req.cluster_id,
            session_id: req.session_id,
        }
    }
}
