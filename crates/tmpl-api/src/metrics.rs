//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "tmpl_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tmpl_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "tmpl_http_requests_in_flight";

    // Render metrics
    pub const RENDERS_SUBMITTED_TOTAL: &str = "tmpl_renders_submitted_total";
    pub const WEBHOOKS_RECEIVED_TOTAL: &str = "tmpl_webhooks_received_total";
}

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("valid uuid regex")
});

static NUMERIC_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[0-9]+(/|$)").expect("valid numeric segment regex"));

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a render submission by outcome (submitted, failed).
pub fn record_render_submitted(outcome: &'static str) {
    counter!(names::RENDERS_SUBMITTED_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a webhook callback by match result (updated, ignored, unknown_job, bad_metadata).
pub fn record_webhook(result: &'static str) {
    counter!(names::WEBHOOKS_RECEIVED_TOTAL, "result" => result).increment(1);
}

/// Sanitize path for metrics labels.
fn sanitize_path(path: &str) -> String {
    let path = UUID_RE.replace_all(path, ":id");
    NUMERIC_SEGMENT_RE
        .replace_all(&path, "/:id$1")
        .into_owned()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/templates/550e8400-e29b-41d4-a716-446655440000/variables"),
            "/api/templates/:id/variables"
        );
        assert_eq!(sanitize_path("/api/renders/42"), "/api/renders/:id");
        assert_eq!(sanitize_path("/api/templates"), "/api/templates");
    }
}
