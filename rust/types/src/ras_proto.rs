// RPC message definitions for `infobase.service.InfobaseManagementService`,
// `ras.service.SessionsService` and `ras.service.RasQueryService`. Fields
// marked `optional` keep proto3 presence, so "absent" and "set to the zero
// value" stay distinguishable.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum DbmsType {
    Unspecified = 0,
    MssqlServer = 1,
    Postgresql = 2,
    IbmDb2 = 3,
    Oracle = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SecurityLevel {
    Unspecified = 0,
    Level0 = 1,
    Level1 = 2,
    Level2 = 3,
    Level3 = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum DropMode {
    Unspecified = 0,
    UnregisterOnly = 1,
    DropDatabase = 2,
    ClearDatabase = 3,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateInfobaseRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(enumeration = "DbmsType", tag = "3")]
    pub dbms: i32,
    #[prost(string, tag = "4")]
    pub db_server: String,
    #[prost(string, tag = "5")]
    pub db_name: String,
    #[prost(string, optional, tag = "6")]
    pub db_user: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub db_password: Option<String>,
    #[prost(string, optional, tag = "8")]
    pub locale: Option<String>,
    #[prost(int32, optional, tag = "9")]
    pub date_offset: Option<i32>,
    #[prost(string, optional, tag = "10")]
    pub description: Option<String>,
    #[prost(enumeration = "SecurityLevel", optional, tag = "11")]
    pub security_level: Option<i32>,
    #[prost(bool, optional, tag = "12")]
    pub scheduled_jobs_deny: Option<bool>,
    #[prost(bool, optional, tag = "13")]
    pub license_distribution_allow: Option<bool>,
    #[prost(string, optional, tag = "14")]
    pub cluster_user: Option<String>,
    #[prost(string, optional, tag = "15")]
    pub cluster_password: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateInfobaseResponse {
    #[prost(string, tag = "1")]
    pub infobase_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub message: String,
    #[prost(bool, tag = "4")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateInfobaseRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub infobase_id: String,
    #[prost(bool, optional, tag = "3")]
    pub sessions_deny: Option<bool>,
    #[prost(bool, optional, tag = "4")]
    pub scheduled_jobs_deny: Option<bool>,
    #[prost(string, optional, tag = "5")]
    pub denied_message: Option<String>,
    #[prost(message, optional, tag = "6")]
    pub denied_from: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "7")]
    pub denied_to: Option<prost_types::Timestamp>,
    #[prost(string, optional, tag = "8")]
    pub permission_code: Option<String>,
    #[prost(enumeration = "DbmsType", optional, tag = "9")]
    pub dbms: Option<i32>,
    #[prost(string, optional, tag = "10")]
    pub db_server: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub db_name: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub db_user: Option<String>,
    #[prost(string, optional, tag = "13")]
    pub db_password: Option<String>,
    #[prost(string, optional, tag = "14")]
    pub description: Option<String>,
    #[prost(enumeration = "SecurityLevel", optional, tag = "15")]
    pub security_level: Option<i32>,
    #[prost(string, optional, tag = "16")]
    pub locale: Option<String>,
    #[prost(int32, optional, tag = "17")]
    pub date_offset: Option<i32>,
    #[prost(bool, optional, tag = "18")]
    pub license_distribution_allow: Option<bool>,
    #[prost(string, optional, tag = "19")]
    pub cluster_user: Option<String>,
    #[prost(string, optional, tag = "20")]
    pub cluster_password: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateInfobaseResponse {
    #[prost(string, tag = "1")]
    pub infobase_id: String,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(bool, tag = "3")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DropInfobaseRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub infobase_id: String,
    #[prost(enumeration = "DropMode", tag = "3")]
    pub drop_mode: i32,
    #[prost(string, optional, tag = "4")]
    pub cluster_user: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub cluster_password: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DropInfobaseResponse {
    #[prost(string, tag = "1")]
    pub infobase_id: String,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(bool, tag = "3")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LockInfobaseRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub infobase_id: String,
    #[prost(bool, tag = "3")]
    pub sessions_deny: bool,
    #[prost(bool, tag = "4")]
    pub scheduled_jobs_deny: bool,
    #[prost(message, optional, tag = "5")]
    pub denied_from: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "6")]
    pub denied_to: Option<prost_types::Timestamp>,
    #[prost(string, optional, tag = "7")]
    pub denied_message: Option<String>,
    #[prost(string, optional, tag = "8")]
    pub permission_code: Option<String>,
    #[prost(string, optional, tag = "9")]
    pub cluster_user: Option<String>,
    #[prost(string, optional, tag = "10")]
    pub cluster_password: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LockInfobaseResponse {
    #[prost(string, tag = "1")]
    pub infobase_id: String,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(bool, tag = "3")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UnlockInfobaseRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub infobase_id: String,
    #[prost(bool, tag = "3")]
    pub unlock_sessions: bool,
    #[prost(bool, tag = "4")]
    pub unlock_scheduled_jobs: bool,
    #[prost(string, optional, tag = "5")]
    pub cluster_user: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub cluster_password: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UnlockInfobaseResponse {
    #[prost(string, tag = "1")]
    pub infobase_id: String,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(bool, tag = "3")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TerminateSessionRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub session_id: String,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct TerminateSessionResponse {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AuthenticateAgentRequest {
    #[prost(string, tag = "1")]
    pub user: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ClusterAuthenticateRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub user: String,
    #[prost(string, tag = "3")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AuthenticateInfobaseRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub user: String,
    #[prost(string, tag = "3")]
    pub password: String,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct AuthenticateResponse {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct GetClustersRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ClusterInfo {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub host: String,
    #[prost(uint32, tag = "3")]
    pub port: u32,
    #[prost(string, tag = "4")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetClustersResponse {
    #[prost(message, repeated, tag = "1")]
    pub clusters: Vec<ClusterInfo>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetClusterInfoRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetClusterInfoResponse {
    #[prost(message, optional, tag = "1")]
    pub cluster: Option<ClusterInfo>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SessionInfo {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub infobase_id: String,
    #[prost(string, tag = "3")]
    pub user_name: String,
    #[prost(string, tag = "4")]
    pub app_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetSessionsRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetSessionsResponse {
    #[prost(message, repeated, tag = "1")]
    pub sessions: Vec<SessionInfo>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InfobaseShort {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetInfobasesShortRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetInfobasesShortResponse {
    #[prost(message, repeated, tag = "1")]
    pub infobases: Vec<InfobaseShort>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetInfobaseSessionsRequest {
    #[prost(string, tag = "1")]
    pub cluster_id: String,
    #[prost(string, tag = "2")]
    pub infobase_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetInfobaseSessionsResponse {
    #[prost(message, repeated, tag = "1")]
    pub sessions: Vec<SessionInfo>,
}

include!(concat!(
    env!("OUT_DIR"),
    "/infobase.service.InfobaseManagementService.rs"
));
include!(concat!(env!("OUT_DIR"), "/ras.service.SessionsService.rs"));
include!(concat!(env!("OUT_DIR"), "/ras.service.RasQueryService.rs"));
