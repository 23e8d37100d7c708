//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_admission_total` (counter): admission outcomes by stage
//! - `gateway_rate_limit_store_errors_total` (counter): failed store calls
//!   by operation
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the recorder
//! - Prometheus scrape endpoint on its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();

    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "gateway_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(elapsed);
}

/// Record what an admission stage did with a request.
pub fn record_admission(stage: &'static str, outcome: &'static str) {
    metrics::counter!("gateway_admission_total", "stage" => stage, "outcome" => outcome)
        .increment(1);
}

/// Record a failed counter store call ("increment" or "expire").
pub fn record_store_error(operation: &'static str) {
    metrics::counter!("gateway_rate_limit_store_errors_total", "operation" => operation)
        .increment(1);
}
