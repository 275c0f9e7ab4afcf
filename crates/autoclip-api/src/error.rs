//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use autoclip_pipeline::PipelineError;

use crate::config::is_production_environment;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(e) if e.is_tool_missing() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(e) => match e {
                PipelineError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
                PipelineError::InvalidMedia(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::Fetch(_) => StatusCode::BAD_GATEWAY,
                PipelineError::Render { .. } | PipelineError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message returned to the client; 500 details stay in the logs in production.
    fn public_detail(&self, production: bool) -> String {
        if production && self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_parameter",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Pipeline(e) => e.kind(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let production = std::env::var("ENVIRONMENT").is_ok_and(|env| is_production_environment(&env));
        let detail = self.public_detail(production);

        if status.is_server_error() {
            tracing::error!(status = %status, "Request failed: {}", self);
        }

        let body = ErrorResponse {
            detail,
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
