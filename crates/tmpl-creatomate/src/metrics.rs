//! Creatomate request metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total Creatomate requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "creatomate_requests_total";

    /// Total retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "creatomate_retries_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "creatomate_latency_seconds";
}

/// Record metrics for a completed request (all attempts included).
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(
        names::RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}
