// The message types live in src/ras_proto.rs as hand-written prost messages,
// so only the service and client plumbing is generated here and no protoc is
// required.
use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic_prost::ProstCodec";

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::ras_proto::{input}"))
        .output_type(format!("crate::ras_proto::{output}"))
        .codec_path(CODEC)
        .build()
}

fn main() {
    let infobase_management = Service::builder()
        .name("InfobaseManagementService")
        .package("infobase.service")
        .method(unary(
            "create_infobase",
            "CreateInfobase",
            "CreateInfobaseRequest",
            "CreateInfobaseResponse",
        ))
        .method(unary(
            "update_infobase",
            "UpdateInfobase",
            "UpdateInfobaseRequest",
            "UpdateInfobaseResponse",
        ))
        .method(unary(
            "drop_infobase",
            "DropInfobase",
            "DropInfobaseRequest",
            "DropInfobaseResponse",
        ))
        .method(unary(
            "lock_infobase",
            "LockInfobase",
            "LockInfobaseRequest",
            "LockInfobaseResponse",
        ))
        .method(unary(
            "unlock_infobase",
            "UnlockInfobase",
            "UnlockInfobaseRequest",
            "UnlockInfobaseResponse",
        ))
        .build();

    let sessions = Service::builder()
        .name("SessionsService")
        .package("ras.service")
        .method(unary(
            "terminate_session",
            "TerminateSession",
            "TerminateSessionRequest",
            "TerminateSessionResponse",
        ))
        .build();

    let query = Service::builder()
        .name("RasQueryService")
        .package("ras.service")
        .method(unary(
            "authenticate_agent",
            "AuthenticateAgent",
            "AuthenticateAgentRequest",
            "AuthenticateResponse",
        ))
        .method(unary(
            "authenticate_cluster",
            "AuthenticateCluster",
            "ClusterAuthenticateRequest",
            "AuthenticateResponse",
        ))
        .method(unary(
            "authenticate_infobase",
            "AuthenticateInfobase",
            "AuthenticateInfobaseRequest",
            "AuthenticateResponse",
        ))
        .method(unary(
            "get_clusters",
            "GetClusters",
            "GetClustersRequest",
            "GetClustersResponse",
        ))
        .method(unary(
            "get_cluster_info",
            "GetClusterInfo",
            "GetClusterInfoRequest",
            "GetClusterInfoResponse",
        ))
        .method(unary(
            "get_sessions",
            "GetSessions",
            "GetSessionsRequest",
            "GetSessionsResponse",
        ))
        .method(unary(
            "get_short_infobases",
            "GetShortInfobases",
            "GetInfobasesShortRequest",
            "GetInfobasesShortResponse",
        ))
        .method(unary(
            "get_infobase_sessions",
            "GetInfobaseSessions",
            "GetInfobaseSessionsRequest",
            "GetInfobaseSessionsResponse",
        ))
        .build();

    println!("cargo:rerun-if-changed=build.rs");
    Builder::new().compile(&[infobase_management, sessions, query]);
}
