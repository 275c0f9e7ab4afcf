//! Axum HTTP API server.
//!
//! This crate provides:
//! - Clip generation from a URL or an uploaded file
//! - Static delivery of rendered clips
//! - Health and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
