//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::handlers::{generate_clips_from_upload, generate_clips_from_url, health};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
///
/// Clips are served from the output directory at the configured public
/// prefix; nothing is mounted when the prefix is an external URL.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/generate-clips-from-url", post(generate_clips_from_url))
        .route("/generate-clips-from-upload", post(generate_clips_from_upload));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    let router = Router::new().nest("/api", api_routes).merge(metrics_routes);

    let pipeline = state.processor.config();
    let clips_service = ServeDir::new(&pipeline.output_dir);
    let router = match pipeline.local_clips_route() {
        Some("") => router.fallback_service(clips_service),
        Some(route) => router.nest_service(route, clips_service),
        None => {
            info!(prefix = %pipeline.public_prefix, "Clips are served by an external host");
            router
        }
    };

    router
        // Uploads are bounded by RequestBodyLimitLayer instead of the extractor default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
