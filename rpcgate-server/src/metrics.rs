//! Gateway metrics
//!
//! OpenTelemetry instruments recorded once per dispatch. They are exported
//! through whatever meter provider is installed globally; with none
//! installed, recording is a no-op.
//!
//! # Metrics Collected
//!
//! - **rpcgate.gateway.requests.total**: dispatches, by `outcome` and `error_kind`
//! - **rpcgate.gateway.request.duration**: dispatch latency in seconds
//! - **rpcgate.gateway.errors.total**: failed dispatches, by `error_kind`

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    InstrumentationScope, KeyValue,
};

/// Outcome label for successful dispatches
pub const OUTCOME_SUCCESS: &str = "success";
/// Outcome label for failed dispatches
pub const OUTCOME_ERROR: &str = "error";

/// Dispatch metrics
pub struct GatewayMetrics {
    /// Total number of dispatches
    pub requests_total: Counter<u64>,
    /// Dispatch duration in seconds
    pub request_duration: Histogram<f64>,
    /// Total number of failed dispatches
    pub errors_total: Counter<u64>,
}

impl GatewayMetrics {
    /// Create instruments on the global meter named after the service
    pub fn new(service_name: impl Into<String>) -> Self {
        let scope = InstrumentationScope::builder(service_name.into()).build();
        let meter = global::meter_with_scope(scope);
        Self::new_with_meter(&meter)
    }

    /// Create instruments on a specific meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("rpcgate.gateway.requests.total")
                .with_description("Total number of gateway dispatches")
                .build(),
            request_duration: meter
                .f64_histogram("rpcgate.gateway.request.duration")
                .with_description("Dispatch duration in seconds")
                .build(),
            errors_total: meter
                .u64_counter("rpcgate.gateway.errors.total")
                .with_description("Total number of failed dispatches")
                .build(),
        }
    }

    /// Record a successful dispatch
    pub fn record_success(&self, duration_secs: f64) {
        let attributes = &[KeyValue::new("outcome", OUTCOME_SUCCESS)];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    /// Record a failed dispatch
    pub fn record_failure(&self, error_kind: &'static str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("outcome", OUTCOME_ERROR),
            KeyValue::new("error_kind", error_kind),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
        self.errors_total.add(1, &[KeyValue::new("error_kind", error_kind)]);
    }
}

impl std::fmt::Debug for GatewayMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayMetrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = GatewayMetrics::new("rpcgate-test");

        metrics.record_success(0.002);
        metrics.record_failure("unknown_target", 0.001);
    }

    #[test]
    fn test_metrics_accept_owned_names() {
        for i in 0..3 {
            let metrics = GatewayMetrics::new(format!("rpcgate-gateway-{}", i));
            metrics.record_success(0.001);
        }
    }

    #[test]
    fn test_metrics_with_custom_meter() {
        let meter = global::meter("rpcgate-test-meter");
        let metrics = GatewayMetrics::new_with_meter(&meter);

        metrics.record_success(0.01);
        metrics.record_success(0.02);
        metrics.record_failure("arity_mismatch", 0.0);
        metrics.record_failure("invocation_failure", 0.5);
    }
}
