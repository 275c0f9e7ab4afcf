//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, describe_counter, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::middleware::is_clip_download;

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "autoclip_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "autoclip_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "autoclip_http_requests_in_flight";

    // Pipeline metrics, recorded by autoclip-pipeline
    pub const JOBS_COMPLETED_TOTAL: &str = "autoclip_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "autoclip_jobs_failed_total";
    pub const CLIPS_RENDERED_TOTAL: &str = "autoclip_clips_rendered_total";
    pub const CLIPS_SKIPPED_TOTAL: &str = "autoclip_clips_skipped_total";
    pub const CLIP_RENDER_DURATION_SECONDS: &str = "autoclip_clip_render_duration_seconds";
}

/// Install the global Prometheus recorder.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(names::JOBS_COMPLETED_TOTAL, "Clip jobs that published their clips");
    describe_counter!(names::JOBS_FAILED_TOTAL, "Clip jobs that failed, by reason");
    describe_counter!(names::CLIPS_RENDERED_TOTAL, "Clips rendered and published");
    describe_counter!(names::CLIPS_SKIPPED_TOTAL, "Clips dropped after a render failure");
    describe_histogram!(names::CLIP_RENDER_DURATION_SECONDS, "Wall time of a single clip encode");

    Ok(handle)
}

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

/// Collapse per-clip paths so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    if is_clip_download(path) {
        if let Some((prefix, _)) = path.rsplit_once('/') {
            return format!("{}/:clip_name", prefix);
        }
    }
    path.to_string()
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
