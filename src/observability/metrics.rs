//! Metrics collection and exposition.
//!
//! # Metrics
//! - `deferred_construction_attempts_total` (counter): attempts by outcome
//! - `deferred_resolution_state` (gauge): 0=attempting, 1=resolved, 2=permanently failed
//! - `deferred_requests_total` (counter): requests by path taken
//! - `deferred_request_wait_seconds` (histogram): time spent waiting for resolution
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::deferred::ResolutionState;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one construction attempt (`outcome` is "success" or "error").
pub fn record_attempt(outcome: &'static str) {
    counter!("deferred_construction_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_state(state: ResolutionState) {
    let value = match state {
        ResolutionState::Attempting => 0.0,
        ResolutionState::Resolved => 1.0,
        ResolutionState::PermanentlyFailed => 2.0,
    };
    gauge!("deferred_resolution_state").set(value);
}

/// Record which path a request took ("direct", "waited", "timed_out", "closed").
pub fn record_request(path: &'static str) {
    counter!("deferred_requests_total", "path" => path).increment(1);
}

pub fn record_wait(waited: Duration) {
    histogram!("deferred_request_wait_seconds").record(waited.as_secs_f64());
}
