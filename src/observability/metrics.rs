//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define process-level request and toolset metrics
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `toolsets_created_total` / `toolsets_released_total` (counters)
//! - `decorated_call_duration_seconds` (histogram): recorded through a
//!   request's [`Meter`](crate::observability::toolset::Meter)
//! - `users_created_total` / `users_deleted_total` (counters, by meter)
//!
//! # Design Decisions
//! - The `metrics` facade is a no-op until a recorder is installed, so
//!   libraries and tests can record freely

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record a finished HTTP request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_toolset_created() {
    metrics::counter!("toolsets_created_total").increment(1);
}

pub fn record_toolset_released() {
    metrics::counter!("toolsets_released_total").increment(1);
}
