//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

/// Register all custom metrics
fn register_metrics() {
    metrics::describe_counter!("relay_requests_total", "Total number of relayed requests");
    metrics::describe_histogram!(
        "relay_request_duration_seconds",
        "Time until the relay response head is ready, in seconds"
    );
    metrics::describe_counter!(
        "relay_project_cache_total",
        "Project id lookups by result (hit, miss, error)"
    );
    metrics::describe_counter!(
        "relay_streams_released_total",
        "Upstream streams released, by outcome"
    );
}

/// Prometheus metrics endpoint handler
///
/// Returns metrics in Prometheus text format for scraping.
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a relayed request
pub fn record_request(status: &str, route: &str, duration_secs: f64) {
    metrics::counter!("relay_requests_total", "status" => status.to_string(), "route" => route.to_string())
        .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "route" => route.to_string())
        .record(duration_secs);
}

/// Record a project cache lookup
pub fn record_project_cache(result: &str) {
    metrics::counter!("relay_project_cache_total", "result" => result.to_string()).increment(1);
}

/// Record how an upstream stream ended
pub fn record_stream_release(outcome: &str) {
    metrics::counter!("relay_streams_released_total", "outcome" => outcome.to_string())
        .increment(1);
}
