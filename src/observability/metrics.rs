//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_upstream_errors_total` (counter): gateway failures by kind
//!   (`unreachable`, `timeout`, `contract_violation`)
//! - `gateway_upstream_relayed_errors_total` (counter): upstream 4xx/5xx relayed, by route, status
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is only installed when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter, serving scrapes on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed local request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    let labels = [
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a gateway-side upstream failure.
pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("gateway_upstream_errors_total", "kind" => kind).increment(1);
}

/// Record an upstream error status that was relayed to the caller.
pub fn record_relayed_error(route: &str, status: u16) {
    let labels = [
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("gateway_upstream_relayed_errors_total", &labels).increment(1);
}
