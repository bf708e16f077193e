//! Metrics collection and exposition.
//!
//! # Metrics
//! - `velum_requests_total` (counter): requests by method, status, route
//! - `velum_request_duration_seconds` (histogram): latency distribution
//! - `velum_validation_failures_total` (counter): fields rejected by validation
//!
//! # Design Decisions
//! - The exporter is optional; without it every update is dropped
//! - Route labels use the route pattern, never the concrete path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter"),
    }
}

fn describe() {
    metrics::describe_counter!("velum_requests_total", "Total number of requests handled");
    metrics::describe_histogram!(
        "velum_request_duration_seconds",
        metrics::Unit::Seconds,
        "Request handling duration"
    );
    metrics::describe_counter!(
        "velum_validation_failures_total",
        "Fields that failed form validation"
    );
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let (method, status, route) = (method.to_string(), status.to_string(), route.to_string());
    metrics::counter!(
        "velum_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "route" => route.clone()
    )
    .increment(1);
    metrics::histogram!(
        "velum_request_duration_seconds",
        "method" => method,
        "status" => status,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_validation_failures(fields: usize) {
    metrics::counter!("velum_validation_failures_total").increment(fields as u64);
}
