//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pricing_rpc_calls_total` (counter): RPC and contract calls by method, outcome
//! - `pricing_rpc_duration_seconds` (histogram): call latency by method
//! - `pricing_transactions_total` (counter): transactions by kind, outcome
//! - `pricing_listing_visible` (gauge): entries shown after filtering, by listing
//! - `pricing_commands_total` (counter): controller commands by name

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rpc_call(method: &'static str, ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("pricing_rpc_calls_total", "method" => method, "outcome" => outcome).increment(1);
    histogram!("pricing_rpc_duration_seconds", "method" => method).record(elapsed.as_secs_f64());
}

/// Outcome is one of `sent`, `rejected`, `failed`.
pub fn record_transaction(kind: &'static str, outcome: &'static str) {
    counter!("pricing_transactions_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_listing(listing: &'static str, visible: usize) {
    gauge!("pricing_listing_visible", "listing" => listing).set(visible as f64);
}

pub fn record_command(name: &'static str) {
    counter!("pricing_commands_total", "command" => name).increment(1);
}
