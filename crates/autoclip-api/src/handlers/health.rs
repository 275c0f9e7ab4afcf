//! Health check handler.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// ffmpeg found at startup
    pub ffmpeg: bool,
    /// Transcription enabled for this process
    pub whisper: bool,
    pub timestamp: String,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ffmpeg: state.ffmpeg_available,
        whisper: state.whisper_available(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
