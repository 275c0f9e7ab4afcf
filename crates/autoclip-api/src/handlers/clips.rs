//! Clip generation handlers.

use axum::extract::multipart::Field;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use autoclip_models::ClipResult;
use autoclip_pipeline::{ClipRequest, JobSource};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters of `POST /api/generate-clips-from-url`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlClipsQuery {
    pub video_url: String,
    pub clips_count: i64,
    pub max_duration: i64,
    pub platform: String,
}

/// Generated clips.
#[derive(Debug, Serialize)]
pub struct ClipsResponse {
    /// "url" or "upload"
    pub mode: &'static str,
    pub clips: Vec<ClipResult>,
}

/// Generate clips from a remote video.
pub async fn generate_clips_from_url(
    State(state): State<AppState>,
    query: Result<Query<UrlClipsQuery>, QueryRejection>,
) -> ApiResult<Json<ClipsResponse>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let request = ClipRequest {
        source: JobSource::Url(query.video_url),
        clips_count: query.clips_count,
        max_duration: query.max_duration,
        platform: query.platform,
    };

    run_job(&state, request).await
}

/// Generate clips from an uploaded video.
///
/// Multipart fields: `file`, `clipsCount`, `maxDuration`, `platform`.
pub async fn generate_clips_from_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ClipsResponse>> {
    let mut file: Option<(Bytes, String)> = None;
    let mut clips_count: Option<i64> = None;
    let mut max_duration: Option<i64> = None;
    let mut platform: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.mp4").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
                file = Some((bytes, filename));
            }
            "clipsCount" => clips_count = Some(int_field(field, "clipsCount").await?),
            "maxDuration" => max_duration = Some(int_field(field, "maxDuration").await?),
            "platform" => platform = Some(text_field(field, "platform").await?),
            _ => {}
        }
    }

    let (bytes, filename) = file.ok_or_else(|| ApiError::bad_request("Missing field: file"))?;
    let request = ClipRequest {
        source: JobSource::Upload { bytes, filename },
        clips_count: clips_count.ok_or_else(|| ApiError::bad_request("Missing field: clipsCount"))?,
        max_duration: max_duration.ok_or_else(|| ApiError::bad_request("Missing field: maxDuration"))?,
        platform: platform.ok_or_else(|| ApiError::bad_request("Missing field: platform"))?,
    };

    run_job(&state, request).await
}

async fn run_job(state: &AppState, request: ClipRequest) -> ApiResult<Json<ClipsResponse>> {
    if !state.ffmpeg_available {
        return Err(ApiError::unavailable("FFmpeg is not installed"));
    }
    if request.clips_count > state.config.max_clips_per_job {
        return Err(ApiError::bad_request(format!(
            "clipsCount must be at most {}",
            state.config.max_clips_per_job
        )));
    }

    let mode = request.source.mode();
    let output = state.processor.submit_job(request).await?;
    info!(job_id = %output.job_id, mode, clips = output.clips.len(), "Clip job finished");

    Ok(Json(ClipsResponse {
        mode,
        clips: output.clips,
    }))
}

async fn text_field(field: Field<'_>, name: &str) -> ApiResult<String> {
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| ApiError::bad_request(format!("Invalid field {}: {}", name, e)))
}

async fn int_field(field: Field<'_>, name: &str) -> ApiResult<i64> {
    let raw = text_field(field, name).await?;
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Field {} must be an integer, got '{}'", name, raw)))
}
