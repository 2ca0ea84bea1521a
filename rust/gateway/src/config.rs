use crate::endpoint::EndpointConfig;
use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use ras_config::helpers::{deserialize_duration_from_seconds, serialize_duration_to_seconds};
use ras_tracing::LogFilter;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "./ras_gateway.yaml";
pub const CONFIG_PATH_ENV_VAR: &str = "CONFIG_PATH";
const ENV_PREFIX: &str = "RAS_";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RootConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl RootConfig {
    /// Loads from `./ras_gateway.yaml` merged with `RAS_` environment
    /// variables. Environment values take precedence over the file, and a
    /// missing file leaves only the environment and the defaults.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Nested keys are written with `__` in environment variables, as in
    /// `RAS_GATEWAY__PORT=4000`.
    pub fn load_from_path(path: &str) -> Result<Self, figment::Error> {
        tracing::info!(path, "loading gateway config");
        let mut f = Figment::from(
            Env::prefixed(ENV_PREFIX).map(|k| k.as_str().replace("__", ".").into()),
        );
        if std::path::Path::new(path).exists() {
            f = Figment::from(Yaml::file(path)).merge(f);
        }
        f.extract()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OpenTelemetryConfig {
    pub endpoint: String,
    #[serde(default = "OpenTelemetryConfig::default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub filters: Vec<LogFilter>,
}

impl OpenTelemetryConfig {
    fn default_service_name() -> String {
        "ras-gateway".to_string()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "GatewayConfig::default_port")]
    pub port: u16,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub opentelemetry: Option<OpenTelemetryConfig>,
    /// Maximum size in bytes for outgoing gRPC messages.
    #[serde(default = "GatewayConfig::default_max_encoding_message_size")]
    pub max_encoding_message_size: usize,
    /// Maximum size in bytes for incoming gRPC messages.
    #[serde(default = "GatewayConfig::default_max_decoding_message_size")]
    pub max_decoding_message_size: usize,
    /// Time between SIGTERM and the server shutting down.
    #[serde(
        rename = "grpc_shutdown_grace_period_seconds",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "GatewayConfig::default_grpc_shutdown_grace_period"
    )]
    pub grpc_shutdown_grace_period: Duration,
}

impl GatewayConfig {
    fn default_port() -> u16 {
        3002
    }

    fn default_max_encoding_message_size() -> usize {
        32_000_000
    }

    fn default_max_decoding_message_size() -> usize {
        32_000_000
    }

    fn default_grpc_shutdown_grace_period() -> Duration {
        Duration::from_secs(1)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: Self::default_port(),
            endpoint: EndpointConfig::default(),
            opentelemetry: None,
            max_encoding_message_size: Self::default_max_encoding_message_size(),
            max_decoding_message_size: Self::default_max_decoding_message_size(),
            grpc_shutdown_grace_period: Self::default_grpc_shutdown_grace_period(),
        }
    }
}
