//! Pipeline error types.

use autoclip_media::MediaError;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller-supplied parameter out of range; raised before any media work.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[source] MediaError),

    /// Source could not be probed or has no usable duration.
    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    #[error("Render failed for clip {moment_id}: {source}")]
    Render {
        moment_id: u32,
        #[source]
        source: MediaError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn invalid_media(msg: impl Into<String>) -> Self {
        Self::InvalidMedia(msg.into())
    }

    pub fn render(moment_id: u32, source: MediaError) -> Self {
        Self::Render { moment_id, source }
    }

    /// Whether the failure came from a missing external tool.
    pub fn is_tool_missing(&self) -> bool {
        match self {
            PipelineError::Fetch(e) | PipelineError::Render { source: e, .. } => e.is_tool_missing(),
            _ => false,
        }
    }

    /// Short machine-readable kind, used for metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidParameter(_) => "invalid_parameter",
            PipelineError::Fetch(_) => "fetch",
            PipelineError::InvalidMedia(_) => "invalid_media",
            PipelineError::Render { .. } => "render",
            PipelineError::Io(_) => "io",
        }
    }
}

impl From<MediaError> for PipelineError {
    /// Media errors outside a fetch or render stage surface as invalid media,
    /// except plain IO which keeps its own variant.
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Io(io) => PipelineError::Io(io),
            MediaError::InvalidUrl(msg) => PipelineError::InvalidParameter(msg),
            other => PipelineError::InvalidMedia(other.to_string()),
        }
    }
}
