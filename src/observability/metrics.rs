//! Metrics collection and exposition.
//!
//! # Metrics
//! - `routewright_requests_total` (counter): requests by method, route, status
//! - `routewright_request_duration_seconds` (histogram): latency by method, route
//! - `routewright_mock_hits_total` (counter): requests answered by a mock
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op
//! - Labels use the route pattern, never the raw path, to bound cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "routewright_requests_total";
pub const REQUEST_DURATION: &str = "routewright_request_duration_seconds";
pub const MOCK_HITS_TOTAL: &str = "routewright_mock_hits_total";

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    ::metrics::describe_counter!(REQUESTS_TOTAL, "Requests dispatched to controllers");
    ::metrics::describe_histogram!(REQUEST_DURATION, "Controller dispatch latency in seconds");
    ::metrics::describe_counter!(MOCK_HITS_TOTAL, "Requests answered from the mock store");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, started: Instant) {
    let method = method.to_string();
    let route = route.to_string();
    ::metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(REQUEST_DURATION, "method" => method, "route" => route)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_mock_hit(method: &str) {
    ::metrics::counter!(MOCK_HITS_TOTAL, "method" => method.to_string()).increment(1);
}
