use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt;
use tracing_subscriber::Registry;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFilterLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogFilterLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFilterLevel::Trace => f.write_str("trace"),
            LogFilterLevel::Debug => f.write_str("debug"),
            LogFilterLevel::Info => f.write_str("info"),
            LogFilterLevel::Warn => f.write_str("warn"),
            LogFilterLevel::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub crate_name: String,
    pub filter_level: LogFilterLevel,
}

// Crate names use underscores, the way they appear as tracing targets.
const GATEWAY_CRATES: &[&str] = &[
    "ras_config",
    "ras_error",
    "ras_gateway",
    "ras_tracing",
    "ras_types",
];

/// Builds the filter directive used when `RUST_LOG` is not set: errors from
/// everything, full detail from the gateway crates, then the custom filters
/// (later directives win for the same target).
pub fn default_filter_directive(custom_filters: &[LogFilter]) -> String {
    let mut directives = vec!["error".to_string(), "opentelemetry_sdk=info".to_string()];
    directives.extend(GATEWAY_CRATES.iter().map(|name| format!("{name}=trace")));
    directives.extend(
        custom_filters
            .iter()
            .map(|filter| format!("{}={}", filter.crate_name, filter.filter_level)),
    );
    directives.join(",")
}

pub fn init_global_filter_layer(
    custom_filters: &[LogFilter],
) -> Box<dyn Layer<Registry> + Send + Sync> {
    EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter_directive(custom_filters)),
    )
    .boxed()
}

pub fn init_otel_layer(
    service_name: &str,
    otel_endpoint: &str,
) -> Box<dyn Layer<Registry> + Send + Sync> {
    tracing::info!(
        "Registering OTLP span exporter for {} at endpoint {}",
        service_name,
        otel_endpoint
    );
    let resource = opentelemetry_sdk::Resource::new(vec![
        opentelemetry::KeyValue::new("service.name", service_name.to_string()),
        opentelemetry::KeyValue::new(
            "service.pod_name",
            std::env::var("HOSTNAME").unwrap_or("unknown".to_string()),
        ),
    ]);

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otel_endpoint)
        .build()
        .expect("could not build span exporter for tracing");
    let trace_config = opentelemetry_sdk::trace::Config::default().with_resource(resource);
    let tracer_provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(span_exporter, opentelemetry_sdk::runtime::Tokio)
        .with_config(trace_config)
        .build();
    let tracer = tracer_provider.tracer(service_name.to_string());
    tracing_opentelemetry::OpenTelemetryLayer::new(tracer).boxed()
}

pub fn init_stdout_layer() -> Box<dyn Layer<Registry> + Send + Sync> {
    fmt::layer().with_target(true).boxed()
}

pub fn init_tracing(layers: Vec<Box<dyn Layer<Registry> + Send + Sync>>) {
    global::set_text_map_propagator(TraceContextPropagator::new());
    let layers = layers
        .into_iter()
        .reduce(|a, b| Box::new(a.and_then(b)))
        .expect("Should be able to create tracing layers");
    let subscriber = tracing_subscriber::registry().with(layers);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Should be able to set global tracing subscriber");
    tracing::info!("Global tracing subscriber set");
}

pub fn init_panic_tracing_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();

        let payload = if let Some(s) = payload.downcast_ref::<&str>() {
            Some(&**s)
        } else {
            payload.downcast_ref::<String>().map(|s| s.as_str())
        };

        tracing::error!(
            panic.payload = payload,
            panic.location = panic_info.location().map(|l| l.to_string()),
            "A panic occurred"
        );

        prev_hook(panic_info);
    }));
}

/// Installs the process-wide subscriber. The OTLP layer is only added when an
/// exporter endpoint is configured.
pub fn init_gateway_tracing(
    service_name: &str,
    custom_filters: &[LogFilter],
    otel_endpoint: Option<&str>,
) {
    // The global filter applies to all subsequent layers.
    let mut layers = vec![init_global_filter_layer(custom_filters)];
    if let Some(endpoint) = otel_endpoint {
        layers.push(init_otel_layer(service_name, endpoint));
    }
    layers.push(init_stdout_layer());
    init_tracing(layers);
    init_panic_tracing_hook();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_lists_gateway_crates_then_custom() {
        let directive = default_filter_directive(&[LogFilter {
            crate_name: "tonic".to_string(),
            filter_level: LogFilterLevel::Warn,
        }]);
        assert!(directive.starts_with("error,opentelemetry_sdk=info,"));
        assert!(directive.contains("ras_gateway=trace"));
        assert!(directive.ends_with("tonic=warn"));
    }

    #[test]
    fn test_filter_level_deserializes_snake_case() {
        let filter: LogFilter =
            serde_json::from_str(r#"{"crate_name": "h2", "filter_level": "debug"}"#).unwrap();
        assert_eq!(filter.filter_level, LogFilterLevel::Debug);
    }
}
