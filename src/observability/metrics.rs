//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cms_requests_total` (counter): catch-all requests by outcome
//! - `cms_gate_checks_total` (counter): routing condition results
//! - `cms_route_table_builds_total` (counter): builds by result
//! - `cms_route_table_entries` (gauge): entries in the last built table
//! - `cms_route_table_build_seconds` (histogram): build latency
//! - `cms_cache_lookups_total` (counter): tag-aware cache hits and misses by key
//! - `cms_render_duration_seconds` (histogram): render latency
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the Prometheus exporter is only
//!   installed when enabled in config
//! - Labels stay low-cardinality (outcomes and cache keys, never paths)

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Outcome of a request on the catch-all route.
pub fn record_request(outcome: &'static str, start: Instant) {
    ::metrics::counter!("cms_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("cms_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_gate_outcome(outcome: &'static str) {
    ::metrics::counter!("cms_gate_checks_total", "outcome" => outcome).increment(1);
}

pub fn record_route_table_build(success: bool, entries: usize, start: Instant) {
    let result = if success { "ok" } else { "error" };
    ::metrics::counter!("cms_route_table_builds_total", "result" => result).increment(1);
    ::metrics::histogram!("cms_route_table_build_seconds").record(start.elapsed().as_secs_f64());
    if success {
        ::metrics::gauge!("cms_route_table_entries").set(entries as f64);
    }
}

pub fn record_cache_lookup(key: &str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    ::metrics::counter!(
        "cms_cache_lookups_total",
        "key" => key.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_render(start: Instant) {
    ::metrics::histogram!("cms_render_duration_seconds").record(start.elapsed().as_secs_f64());
}
