//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sed_aggregator_http_requests_total` (counter): requests by method, route, status
//! - `sed_aggregator_http_request_duration_seconds` (histogram): latency by method, route
//! - `sed_aggregator_http_requests_in_flight` (gauge): requests currently being served
//!
//! Recording is a no-op until a recorder is installed, so handlers and tests
//! can call these freely.

use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::sync::broadcast;

use crate::lifecycle::shutdown::{wait_for_shutdown, ShutdownReason};

pub const REQUESTS_TOTAL: &str = "sed_aggregator_http_requests_total";
pub const REQUEST_DURATION: &str = "sed_aggregator_http_request_duration_seconds";
pub const REQUESTS_IN_FLIGHT: &str = "sed_aggregator_http_requests_in_flight";

const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Install the global Prometheus recorder.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)?
        .install_recorder()
}

/// Periodically compact histogram storage until shutdown.
pub fn spawn_upkeep(
    handle: PrometheusHandle,
    mut shutdown: broadcast::Receiver<ShutdownReason>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(UPKEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => handle.run_upkeep(),
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }
    })
}

/// Record a completed request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();

    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => route.to_string()
    )
    .record(elapsed);
}

pub fn set_in_flight(count: u64) {
    metrics::gauge!(REQUESTS_IN_FLIGHT).set(count as f64);
}
