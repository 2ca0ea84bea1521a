pub mod config;
mod dispatch;
pub mod endpoint;
pub mod error;
pub mod in_memory;
pub mod interceptor;
pub mod lifecycle;
pub mod query;
pub mod server;
pub mod sessions;
pub mod validator;

#[cfg(test)]
mod test_support;

use config::{RootConfig, CONFIG_PATH_ENV_VAR};
use ras_config::Configurable;
use ras_error::RasError;
use server::GatewayServer;

pub use error::GatewayError;
pub use lifecycle::{InfobaseLifecycle, LifecycleOutcome};
pub use query::ClusterQuery;
pub use sessions::SessionControl;

const DEFAULT_SERVICE_NAME: &str = "ras-gateway";

/// Loads the config, installs the tracing subscriber and serves the RPC
/// services until SIGTERM.
pub async fn entrypoint() {
    let config = match std::env::var(CONFIG_PATH_ENV_VAR) {
        Ok(config_path) => RootConfig::load_from_path(&config_path),
        Err(_) => RootConfig::load(),
    };
    let config = match config {
        Ok(config) => config.gateway,
        Err(err) => {
            eprintln!("Error loading config: {err}");
            std::process::exit(1);
        }
    };

    match &config.opentelemetry {
        Some(otel_config) => {
            eprintln!("enabling tracing export");
            ras_tracing::init_gateway_tracing(
                &otel_config.service_name,
                &otel_config.filters,
                Some(&otel_config.endpoint),
            );
        }
        None => ras_tracing::init_gateway_tracing(DEFAULT_SERVICE_NAME, &[], None),
    }

    let gateway = match GatewayServer::try_from_config(&config).await {
        Ok(gateway) => gateway,
        Err(err) => {
            tracing::error!(error = %err, code = %err.code(), "Failed to create gateway server");
            return;
        }
    };

    let server_join_handle = tokio::spawn(async move {
        if let Err(e) = gateway.run().await {
            tracing::error!("Server terminated with error: {:?}", e);
        }
    });

    if let Err(e) = server_join_handle.await {
        tracing::error!("Error terminating server: {:?}", e);
    }
}
