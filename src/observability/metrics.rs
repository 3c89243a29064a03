//! Metrics collection and exposition.
//!
//! # Metrics
//! - `handler_router_dispatch_total` (counter): dispatches by outcome
//! - `handler_router_dispatch_duration_seconds` (histogram): dispatch latency
//! - `handler_router_named_routes` (gauge): entries in the named route table
//! - `handler_router_indexed_types` (gauge): entries in the indexed route table
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is opt-in via configuration

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(err) => tracing::error!(address = %addr, error = %err, "Failed to install metrics exporter"),
    }
}

/// Record one dispatch through the handler graph.
pub fn record_dispatch(outcome: &'static str, started: Instant) {
    counter!("handler_router_dispatch_total", "outcome" => outcome).increment(1);
    histogram!("handler_router_dispatch_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

/// Publish the current route cache sizes.
pub fn record_route_cache(named: usize, indexed: usize) {
    gauge!("handler_router_named_routes").set(named as f64);
    gauge!("handler_router_indexed_types").set(indexed as f64);
}
