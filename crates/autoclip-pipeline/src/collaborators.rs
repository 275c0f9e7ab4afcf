//! External collaborators of the clip pipeline.
//!
//! The orchestrator only talks to the outside world through these traits.
//! Production implementations shell out to yt-dlp, ffmpeg/ffprobe and the
//! Whisper CLI via `autoclip-media`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use autoclip_media::{ClipRenderSpec, MediaResult, WhisperOptions};
use autoclip_models::TranscriptSegment;

use crate::config::PipelineConfig;

/// Name of the fetched source inside the job directory.
pub const SOURCE_FILE_NAME: &str = "source.mp4";

/// Retrieves a remote video.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    /// Download `url` into `dest_dir`, returning the local file.
    async fn fetch(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf>;
}

/// Decodes, probes and encodes media.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Source duration in seconds.
    async fn duration(&self, video: &Path) -> MediaResult<f64>;

    /// Write a 16 kHz mono WAV of the source's audio to `audio_out`.
    async fn extract_audio(&self, video: &Path, audio_out: &Path) -> MediaResult<()>;

    /// Encode one clip.
    async fn render(&self, spec: ClipRenderSpec) -> MediaResult<()>;
}

/// Speech-to-text engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> MediaResult<Vec<TranscriptSegment>>;
}

/// Collaborator set handed to the job processor.
///
/// `transcriber` is `None` when transcription is disabled for this process.
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn VideoFetcher>,
    pub media: Arc<dyn MediaEngine>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
}

impl Collaborators {
    pub fn new(
        fetcher: Arc<dyn VideoFetcher>,
        media: Arc<dyn MediaEngine>,
        transcriber: Option<Arc<dyn Transcriber>>,
    ) -> Self {
        Self {
            fetcher,
            media,
            transcriber,
        }
    }

    /// Tool-backed collaborators configured from `config`.
    pub fn system(config: &PipelineConfig) -> Self {
        let transcriber: Option<Arc<dyn Transcriber>> = config.transcription_enabled.then(|| {
            let options = WhisperOptions::default()
                .with_model(config.whisper_model.clone())
                .with_language(config.whisper_language.clone())
                .with_timeout(config.whisper_timeout_secs);
            Arc::new(WhisperCliTranscriber::new(options)) as Arc<dyn Transcriber>
        });

        Self {
            fetcher: Arc::new(YtDlpFetcher::new(config.download_timeout_secs)),
            media: Arc::new(FfmpegEngine::new(config.ffmpeg_timeout_secs)),
            transcriber,
        }
    }

    pub fn transcription_enabled(&self) -> bool {
        self.transcriber.is_some()
    }
}

/// Fetches videos with yt-dlp.
#[derive(Debug, Clone, Copy, Default)]
pub struct YtDlpFetcher {
    timeout_secs: Option<u64>,
}

impl YtDlpFetcher {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self { timeout_secs }
    }
}

#[async_trait]
impl VideoFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
        let dest = dest_dir.join(SOURCE_FILE_NAME);
        autoclip_media::download_video(url, &dest, self.timeout_secs).await?;
        Ok(dest)
    }
}

/// ffprobe/ffmpeg backed media engine.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEngine {
    timeout_secs: Option<u64>,
}

impl FfmpegEngine {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self { timeout_secs }
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn duration(&self, video: &Path) -> MediaResult<f64> {
        autoclip_media::get_duration(video).await
    }

    async fn extract_audio(&self, video: &Path, audio_out: &Path) -> MediaResult<()> {
        autoclip_media::extract_audio(video, audio_out).await
    }

    async fn render(&self, mut spec: ClipRenderSpec) -> MediaResult<()> {
        if spec.timeout_secs.is_none() {
            spec.timeout_secs = self.timeout_secs;
        }
        autoclip_media::render_clip(&spec).await
    }
}

/// Whisper CLI transcriber.
#[derive(Debug, Clone, Default)]
pub struct WhisperCliTranscriber {
    options: WhisperOptions,
}

impl WhisperCliTranscriber {
    pub fn new(options: WhisperOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio: &Path) -> MediaResult<Vec<TranscriptSegment>> {
        autoclip_media::transcribe_audio(audio, &self.options).await
    }
}
