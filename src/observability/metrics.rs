//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define selector metrics (picks, filtered candidates, empty selections)
//! - Track per-node failure reports
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `selector_selections_total` (counter): picks by node
//! - `selector_filtered_total` (counter): candidates removed by filter
//! - `selector_empty_total` (counter): selections with no viable candidate
//! - `selector_node_failures_total` (counter): failures reported by node
//! - `selector_pool_nodes` (gauge): nodes in the current pool snapshot
//! - `selector_pool_version` (gauge): current pool snapshot version

use std::net::SocketAddr;

use ::metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_selection(node: &str) {
    counter!("selector_selections_total", "node" => node.to_string()).increment(1);
}

pub fn record_filtered(filter: &'static str, removed: usize) {
    if removed > 0 {
        counter!("selector_filtered_total", "filter" => filter).increment(removed as u64);
    }
}

pub fn record_empty_selection() {
    counter!("selector_empty_total").increment(1);
}

pub fn record_node_failure(node: &str) {
    counter!("selector_node_failures_total", "node" => node.to_string()).increment(1);
}

pub fn record_pool(version: u64, nodes: usize) {
    gauge!("selector_pool_version").set(version as f64);
    gauge!("selector_pool_nodes").set(nodes as f64);
}
