//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_router_dispatch_total` (counter): dispatches by outcome
//!   (`matched`, `pass_through`, `error`)
//! - `edge_router_dispatch_duration_seconds` (histogram): dispatch latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished dispatch.
pub fn record_dispatch(outcome: &'static str, start: Instant) {
    metrics::counter!("edge_router_dispatch_total", "outcome" => outcome).increment(1);
    metrics::histogram!("edge_router_dispatch_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
