//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use autoclip_pipeline::{ClipJobProcessor, Collaborators, PipelineConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub processor: ClipJobProcessor,
    /// Whether ffmpeg was found at startup
    pub ffmpeg_available: bool,
}

impl AppState {
    /// Create state backed by the system tools.
    ///
    /// The clip output directory is created here, once per process.
    pub async fn new(config: ApiConfig, pipeline: PipelineConfig) -> std::io::Result<Self> {
        let ffmpeg_available = autoclip_media::check_ffmpeg().is_ok();
        if !ffmpeg_available {
            warn!("ffmpeg not found on PATH; clip generation is disabled");
        }

        let collaborators = Collaborators::system(&pipeline);
        Self::with_collaborators(config, pipeline, collaborators, ffmpeg_available).await
    }

    /// Create state with explicit collaborators.
    pub async fn with_collaborators(
        config: ApiConfig,
        pipeline: PipelineConfig,
        collaborators: Collaborators,
        ffmpeg_available: bool,
    ) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(&pipeline.output_dir).await?;
        info!(
            output_dir = %pipeline.output_dir.display(),
            work_dir = %pipeline.work_dir.display(),
            transcription = collaborators.transcription_enabled(),
            selection = %pipeline.selection_policy,
            render_failure = pipeline.render_failure_policy.as_str(),
            "Pipeline configured"
        );

        Ok(Self {
            config: Arc::new(config),
            processor: ClipJobProcessor::new(pipeline, collaborators),
            ffmpeg_available,
        })
    }

    pub fn whisper_available(&self) -> bool {
        self.processor.transcription_enabled()
    }
}
