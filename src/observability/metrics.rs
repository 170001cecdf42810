//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency
//! - `gateway_guard_rejections_total` (counter): rejections by kind
//! - `gateway_logins_total` (counter): login attempts by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(err) => tracing::error!(error = %err, "Failed to start metrics exporter"),
    }
}

/// Count a completed request and observe its latency.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Count a guard rejection by kind.
pub fn record_guard_rejection(kind: &'static str) {
    metrics::counter!("gateway_guard_rejections_total", "kind" => kind).increment(1);
}

/// Count a login attempt outcome.
pub fn record_login(outcome: &'static str) {
    metrics::counter!("gateway_logins_total", "outcome" => outcome).increment(1);
}
