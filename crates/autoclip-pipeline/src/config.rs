//! Pipeline configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use autoclip_media::transcribe::DEFAULT_WHISPER_MODEL;
use autoclip_models::EncodingConfig;

use crate::selection::SelectionPolicy;

/// What a job does when one clip fails to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderFailurePolicy {
    /// Fail the whole job; no clips are published.
    #[default]
    Abort,
    /// Log the failure, omit the clip and keep going.
    Skip,
}

impl RenderFailurePolicy {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "abort" => Some(RenderFailurePolicy::Abort),
            "skip" => Some(RenderFailurePolicy::Skip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderFailurePolicy::Abort => "abort",
            RenderFailurePolicy::Skip => "skip",
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root under which per-job working directories are created
    pub work_dir: PathBuf,
    /// Directory rendered clips are published to
    pub output_dir: PathBuf,
    /// URL prefix clips are served under: a path served by this process
    /// (e.g. `/clips`) or an absolute URL of an external host
    pub public_prefix: String,
    pub transcription_enabled: bool,
    pub whisper_model: String,
    /// Spoken language passed to Whisper; auto-detected when unset
    pub whisper_language: Option<String>,
    pub selection_policy: SelectionPolicy,
    pub render_failure_policy: RenderFailurePolicy,
    /// Per-clip FFmpeg wall-clock limit
    pub ffmpeg_timeout_secs: Option<u64>,
    /// yt-dlp wall-clock limit
    pub download_timeout_secs: Option<u64>,
    /// Whisper wall-clock limit
    pub whisper_timeout_secs: Option<u64>,
    pub encoding: EncodingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("autoclip"),
            output_dir: PathBuf::from("clips"),
            public_prefix: "/clips".to_string(),
            transcription_enabled: false,
            whisper_model: DEFAULT_WHISPER_MODEL.to_string(),
            whisper_language: None,
            selection_policy: SelectionPolicy::default(),
            render_failure_policy: RenderFailurePolicy::default(),
            ffmpeg_timeout_secs: Some(1800),
            download_timeout_secs: Some(1800),
            whisper_timeout_secs: Some(3600),
            encoding: EncodingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    ///
    /// `TRANSCRIPTION_ENABLED` defaults to whether `whisper` is on `PATH`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let transcription_enabled = std::env::var("TRANSCRIPTION_ENABLED")
            .ok()
            .and_then(|s| parse_bool(&s))
            .unwrap_or_else(|| autoclip_media::check_whisper().is_ok());

        let selection_policy = match std::env::var("SELECTION_POLICY") {
            Ok(raw) => SelectionPolicy::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown SELECTION_POLICY '{}', using {}", raw, defaults.selection_policy);
                defaults.selection_policy
            }),
            Err(_) => defaults.selection_policy,
        };

        let render_failure_policy = match std::env::var("RENDER_FAILURE_POLICY") {
            Ok(raw) => RenderFailurePolicy::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown RENDER_FAILURE_POLICY '{}', using abort", raw);
                defaults.render_failure_policy
            }),
            Err(_) => defaults.render_failure_policy,
        };

        Self {
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            output_dir: std::env::var("CLIPS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            public_prefix: std::env::var("CLIPS_PUBLIC_PREFIX")
                .map(|p| p.trim().to_string())
                .unwrap_or(defaults.public_prefix),
            transcription_enabled,
            whisper_model: std::env::var("WHISPER_MODEL").unwrap_or(defaults.whisper_model),
            whisper_language: std::env::var("WHISPER_LANGUAGE")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            selection_policy,
            render_failure_policy,
            ffmpeg_timeout_secs: timeout_from_env("FFMPEG_TIMEOUT_SECS", defaults.ffmpeg_timeout_secs),
            download_timeout_secs: timeout_from_env("DOWNLOAD_TIMEOUT_SECS", defaults.download_timeout_secs),
            whisper_timeout_secs: timeout_from_env("WHISPER_TIMEOUT_SECS", defaults.whisper_timeout_secs),
            encoding: defaults.encoding,
        }
    }

    /// Public URL for a published clip file.
    pub fn download_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), file_name)
    }

    /// Route this process must serve clips under, or `None` when the
    /// prefix points at an external host.
    ///
    /// A bare `/` yields `Some("")`: clips sit at the root.
    pub fn local_clips_route(&self) -> Option<&str> {
        self.public_prefix
            .starts_with('/')
            .then(|| self.public_prefix.trim_end_matches('/'))
    }
}

/// Read a timeout in seconds; `0` disables it.
fn timeout_from_env(name: &str, default: Option<u64>) -> Option<u64> {
    match std::env::var(name).ok().and_then(|s| s.trim().parse::<u64>().ok()) {
        Some(0) => None,
        Some(secs) => Some(secs),
        None => default,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
