//! Clip encoding.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use autoclip_models::{EncodingConfig, FrameSize};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::build_clip_filter;

/// Everything needed to encode one clip.
#[derive(Debug, Clone)]
pub struct ClipRenderSpec {
    /// Source video
    pub input: PathBuf,
    /// Destination MP4
    pub output: PathBuf,
    /// Window start in source seconds
    pub start: f64,
    /// Window end in source seconds
    pub end: f64,
    /// Output frame
    pub frame: FrameSize,
    /// Optional SRT track, timed relative to `start`
    pub captions: Option<PathBuf>,
    pub encoding: EncodingConfig,
    /// FFmpeg wall-clock limit in seconds
    pub timeout_secs: Option<u64>,
}

impl ClipRenderSpec {
    /// Clip duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    fn build_command(&self) -> FfmpegCommand {
        FfmpegCommand::new(&self.input, &self.output)
            .window(self.start, self.duration())
            .video_filter(build_clip_filter(self.frame, self.captions.as_deref()))
            .encoding(&self.encoding)
            .faststart()
    }
}

/// Encode a single clip.
///
/// The source is seeked before decoding so output timestamps start at
/// zero, which is what the caption track expects.
pub async fn render_clip(spec: &ClipRenderSpec) -> MediaResult<()> {
    if !(spec.duration() > 0.0) {
        return Err(MediaError::invalid_video(format!(
            "empty clip window {:.3}..{:.3}",
            spec.start, spec.end
        )));
    }
    if !spec.input.exists() {
        return Err(MediaError::FileNotFound(spec.input.clone()));
    }

    info!(
        "Rendering clip: {} -> {} ({:.2}s..{:.2}s, {})",
        spec.input.display(),
        spec.output.display(),
        spec.start,
        spec.end,
        spec.frame
    );

    let cmd = spec.build_command();
    let mut runner = FfmpegRunner::new();
    if let Some(secs) = spec.timeout_secs {
        runner = runner.with_timeout(secs);
    }

    let total = spec.duration();
    runner
        .run_with_progress(&cmd, move |p| {
            debug!("clip progress {:.0}%", p.percentage(total));
        })
        .await?;

    ensure_output(&spec.output)
}

fn ensure_output(path: &Path) -> MediaResult<()> {
    match path.metadata() {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(MediaError::ffmpeg_failed(
            format!("FFmpeg produced no output at {}", path.display()),
            None,
            None,
        )),
    }
}
