//! Per-moment clip rendering.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use autoclip_media::ClipRenderSpec;
use autoclip_models::{EncodingConfig, Moment, Platform};

use crate::captions::CaptionTrack;
use crate::collaborators::MediaEngine;
use crate::error::{PipelineError, PipelineResult};

/// Renders moments of one source into a job directory.
pub struct ClipRenderer {
    media: Arc<dyn MediaEngine>,
    encoding: EncodingConfig,
    job_dir: PathBuf,
}

impl ClipRenderer {
    pub fn new(media: Arc<dyn MediaEngine>, encoding: EncodingConfig, job_dir: impl Into<PathBuf>) -> Self {
        Self {
            media,
            encoding,
            job_dir: job_dir.into(),
        }
    }

    /// Path a moment's clip is rendered to inside the job directory.
    pub fn clip_path(&self, moment: &Moment) -> PathBuf {
        self.job_dir.join(format!("clip_{}.mp4", moment.id))
    }

    /// Encode `moment` of `source` framed for `platform`.
    ///
    /// A non-empty caption track is written to a temporary `.srt` in the
    /// job directory for the duration of the encode only.
    pub async fn render(
        &self,
        source: &Path,
        moment: &Moment,
        platform: Platform,
        captions: &CaptionTrack,
    ) -> PipelineResult<PathBuf> {
        let output = self.clip_path(moment);

        let caption_file = if captions.is_empty() {
            None
        } else {
            let mut file = tempfile::Builder::new()
                .prefix(&format!("clip_{}_", moment.id))
                .suffix(".srt")
                .tempfile_in(&self.job_dir)?;
            file.write_all(captions.to_srt().as_bytes())?;
            file.flush()?;
            debug!(
                moment_id = moment.id,
                cues = captions.len(),
                path = %file.path().display(),
                "Wrote caption track"
            );
            Some(file)
        };

        let spec = ClipRenderSpec {
            input: source.to_path_buf(),
            output: output.clone(),
            start: moment.start,
            end: moment.end,
            frame: platform.frame_size(),
            captions: caption_file.as_ref().map(|f| f.path().to_path_buf()),
            encoding: self.encoding.clone(),
            timeout_secs: None,
        };

        let started = Instant::now();
        let result = self.media.render(spec).await;
        // Caption file is removed here on both outcomes
        drop(caption_file);

        result.map_err(|e| PipelineError::render(moment.id, e))?;

        let elapsed = started.elapsed().as_secs_f64();
        metrics::histogram!("autoclip_clip_render_duration_seconds", "platform" => platform.as_str())
            .record(elapsed);
        info!(
            moment_id = moment.id,
            start = moment.start,
            end = moment.end,
            platform = %platform,
            elapsed_secs = elapsed,
            "Rendered clip"
        );

        Ok(output)
    }
}
