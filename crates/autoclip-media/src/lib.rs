//! External media tool wrappers.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe duration/stream probing
//! - Remote video fetch through yt-dlp
//! - Audio extraction and Whisper CLI transcription
//! - Platform-framed clip encoding with burned-in captions

pub mod audio;
pub mod clip;
pub mod command;
pub mod download;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod progress;
pub mod transcribe;

pub use audio::extract_audio;
pub use clip::{render_clip, ClipRenderSpec};
pub use command::{check_ffmpeg, check_ffprobe, check_whisper, check_ytdlp, FfmpegCommand, FfmpegRunner};
pub use download::{download_video, validate_source_url};
pub use error::{MediaError, MediaResult};
pub use fs_utils::move_file;
pub use probe::{get_duration, probe_video, VideoInfo};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use transcribe::{transcribe_audio, WhisperOptions};
