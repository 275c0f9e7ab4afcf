//! Clip job orchestration.
//!
//! A job runs `fetch → probe → transcribe (optional) → select → render →
//! publish` inside its own temporary directory. Clips only reach the
//! output directory once rendering is over, so a failed job never leaves
//! partial output behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::Instrument;

use autoclip_media::{move_file, validate_source_url};
use autoclip_models::moment::clip_file_name;
use autoclip_models::timestamp::format_seconds;
use autoclip_models::{ClipResult, JobId, JobStage, Moment, Platform, TranscriptSegment};

use crate::captions::CaptionTrack;
use crate::collaborators::Collaborators;
use crate::config::{PipelineConfig, RenderFailurePolicy};
use crate::error::{PipelineError, PipelineResult};
use crate::logging::JobLogger;
use crate::renderer::ClipRenderer;
use crate::scoring::score_segments;
use crate::selection::{ensure_duration, SelectionParams};

const AUDIO_FILE_NAME: &str = "audio.wav";
const UPLOAD_FILE_STEM: &str = "upload";

/// Where a job's source video comes from.
#[derive(Debug, Clone)]
pub enum JobSource {
    /// Remote video, fetched by the [`VideoFetcher`](crate::collaborators::VideoFetcher)
    Url(String),
    /// Bytes uploaded by the caller
    Upload { bytes: Bytes, filename: String },
}

impl JobSource {
    /// Response mode label.
    pub fn mode(&self) -> &'static str {
        match self {
            JobSource::Url(_) => "url",
            JobSource::Upload { .. } => "upload",
        }
    }

    fn operation(&self) -> &'static str {
        match self {
            JobSource::Url(_) => "clips_from_url",
            JobSource::Upload { .. } => "clips_from_upload",
        }
    }

    fn validate(&self) -> PipelineResult<()> {
        match self {
            JobSource::Url(url) => validate_source_url(url)
                .map(|_| ())
                .map_err(|e| PipelineError::invalid_parameter(e.to_string())),
            JobSource::Upload { bytes, .. } if bytes.is_empty() => {
                Err(PipelineError::invalid_parameter("uploaded file is empty"))
            }
            JobSource::Upload { .. } => Ok(()),
        }
    }
}

/// A clip job as submitted by the transport.
#[derive(Debug, Clone)]
pub struct ClipRequest {
    pub source: JobSource,
    pub clips_count: i64,
    pub max_duration: i64,
    /// Platform name as given by the caller; echoed in results
    pub platform: String,
}

/// Result of a finished job.
#[derive(Debug, Clone)]
pub struct JobOutput {
    pub job_id: JobId,
    /// Published clips in ascending id order
    pub clips: Vec<ClipResult>,
}

/// Runs clip jobs against a set of collaborators.
#[derive(Clone)]
pub struct ClipJobProcessor {
    config: Arc<PipelineConfig>,
    collaborators: Collaborators,
}

impl ClipJobProcessor {
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Self {
        Self {
            config: Arc::new(config),
            collaborators,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn transcription_enabled(&self) -> bool {
        self.collaborators.transcription_enabled()
    }

    /// Run a job to completion.
    ///
    /// Parameters are validated before any collaborator is called.
    pub async fn submit_job(&self, request: ClipRequest) -> PipelineResult<JobOutput> {
        let params = SelectionParams::new(request.clips_count, request.max_duration)?;
        request.source.validate()?;

        let job_id = JobId::new();
        let mode = request.source.mode();
        let mut logger = JobLogger::new(&job_id, request.source.operation());
        let span = logger.create_span();

        logger.log_start(&format!(
            "{} clips of at most {}s for {}",
            params.clips_count(),
            params.max_duration(),
            request.platform
        ));

        let result = self
            .run_job(&job_id, &request, params, &mut logger)
            .instrument(span)
            .await;

        match result {
            Ok(clips) => {
                metrics::counter!("autoclip_jobs_completed_total", "mode" => mode).increment(1);
                Ok(JobOutput { job_id, clips })
            }
            Err(e) => {
                logger.advance(JobStage::Failed, &e.to_string());
                metrics::counter!("autoclip_jobs_failed_total", "mode" => mode, "reason" => e.kind())
                    .increment(1);
                Err(e)
            }
        }
    }

    async fn run_job(
        &self,
        job_id: &JobId,
        request: &ClipRequest,
        params: SelectionParams,
        logger: &mut JobLogger,
    ) -> PipelineResult<Vec<ClipResult>> {
        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        // Removed on drop, whichever way this function returns
        let job_dir = tempfile::Builder::new()
            .prefix(&format!("job_{}_", job_id))
            .tempdir_in(&self.config.work_dir)?;

        let source = self.acquire_source(&request.source, job_dir.path()).await?;
        logger.advance(JobStage::Fetched, &source.display().to_string());

        let duration = self
            .collaborators
            .media
            .duration(&source)
            .await
            .map_err(|e| PipelineError::invalid_media(e.to_string()))?;
        ensure_duration(duration)?;
        logger.log_progress(&format!("source duration {}", format_seconds(duration)));

        let transcript = self.transcribe(&source, job_dir.path(), logger).await;

        let candidates = score_segments(&transcript);
        let selector = self.config.selection_policy.selector();
        let moments = selector.select(duration, &candidates, &params)?;
        logger.advance(
            JobStage::Selected,
            &format!("{} moments via {}", moments.len(), selector.name()),
        );

        let platform = Platform::from_name(&request.platform);
        let rendered = self
            .render_all(&source, &moments, platform, &transcript, job_dir.path(), logger)
            .await?;

        let clips = self.publish(job_id, &rendered, &request.platform).await?;
        metrics::counter!("autoclip_clips_rendered_total", "platform" => platform.as_str())
            .increment(clips.len() as u64);
        logger.advance(JobStage::Done, &format!("{} clips published", clips.len()));

        Ok(clips)
    }

    async fn acquire_source(&self, source: &JobSource, job_dir: &Path) -> PipelineResult<PathBuf> {
        match source {
            JobSource::Url(url) => self
                .collaborators
                .fetcher
                .fetch(url, job_dir)
                .await
                .map_err(PipelineError::Fetch),
            JobSource::Upload { bytes, filename } => {
                let path = job_dir.join(upload_file_name(filename));
                tokio::fs::write(&path, bytes).await?;
                Ok(path)
            }
        }
    }

    /// Transcribe the source, or return an empty transcript.
    ///
    /// Transcription problems never fail the job.
    async fn transcribe(&self, source: &Path, job_dir: &Path, logger: &mut JobLogger) -> Vec<TranscriptSegment> {
        let Some(transcriber) = &self.collaborators.transcriber else {
            logger.advance(JobStage::SkippedTranscription, "transcription disabled");
            return Vec::new();
        };

        let audio = job_dir.join(AUDIO_FILE_NAME);
        if let Err(e) = self.collaborators.media.extract_audio(source, &audio).await {
            logger.log_warning(&format!("audio extraction failed: {}", e));
            logger.advance(JobStage::SkippedTranscription, "no audio");
            return Vec::new();
        }

        match transcriber.transcribe(&audio).await {
            Ok(segments) if !segments.is_empty() => {
                logger.advance(JobStage::Transcribed, &format!("{} segments", segments.len()));
                segments
            }
            Ok(_) => {
                logger.advance(JobStage::SkippedTranscription, "empty transcript");
                Vec::new()
            }
            Err(e) => {
                logger.log_warning(&format!("transcription failed: {}", e));
                logger.advance(JobStage::SkippedTranscription, "transcription failed");
                Vec::new()
            }
        }
    }

    async fn render_all(
        &self,
        source: &Path,
        moments: &[Moment],
        platform: Platform,
        transcript: &[TranscriptSegment],
        job_dir: &Path,
        logger: &mut JobLogger,
    ) -> PipelineResult<Vec<(Moment, PathBuf)>> {
        let renderer = ClipRenderer::new(
            self.collaborators.media.clone(),
            self.config.encoding.clone(),
            job_dir,
        );
        let mut rendered = Vec::with_capacity(moments.len());
        let mut last_failure = None;

        for moment in moments {
            logger.advance(
                JobStage::Rendering,
                &format!("clip {}/{}", moment.id, moments.len()),
            );
            let captions = CaptionTrack::for_window(transcript, moment);

            match renderer.render(source, moment, platform, &captions).await {
                Ok(path) => rendered.push((*moment, path)),
                Err(e) => match self.config.render_failure_policy {
                    RenderFailurePolicy::Abort => {
                        logger.log_error(&format!("clip {} failed, aborting job: {}", moment.id, e));
                        return Err(e);
                    }
                    RenderFailurePolicy::Skip => {
                        logger.log_warning(&format!("skipping clip {}: {}", moment.id, e));
                        metrics::counter!("autoclip_clips_skipped_total").increment(1);
                        last_failure = Some(e);
                    }
                },
            }
        }

        // Skipping every clip is still a failed job
        match last_failure {
            Some(e) if rendered.is_empty() => Err(e),
            _ => Ok(rendered),
        }
    }

    /// Move rendered clips into the output directory.
    ///
    /// If any move fails, clips already published by this job are removed.
    async fn publish(
        &self,
        job_id: &JobId,
        rendered: &[(Moment, PathBuf)],
        platform_name: &str,
    ) -> PipelineResult<Vec<ClipResult>> {
        let output_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(output_dir).await?;

        let mut published: Vec<PathBuf> = Vec::with_capacity(rendered.len());
        let mut clips = Vec::with_capacity(rendered.len());

        for (moment, path) in rendered {
            let file_name = clip_file_name(job_id.as_str(), moment.id);
            let dest = output_dir.join(&file_name);

            if let Err(e) = move_file(path, &dest).await {
                for done in &published {
                    let _ = tokio::fs::remove_file(done).await;
                }
                return Err(e.into());
            }

            published.push(dest);
            clips.push(ClipResult::from_moment(moment, platform_name, self.config.download_url(&file_name)));
        }

        Ok(clips)
    }
}

/// Local name for an uploaded source; only a short alphanumeric extension
/// of the caller's file name is kept.
fn upload_file_name(filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "mp4".to_string());
    format!("{}.{}", UPLOAD_FILE_STEM, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockMediaEngine, MockTranscriber, MockVideoFetcher, SOURCE_FILE_NAME};
    use crate::selection::SelectionPolicy;
    use autoclip_media::MediaError;
    use tempfile::TempDir;

    struct Dirs {
        _root: TempDir,
        work: PathBuf,
        output: PathBuf,
    }

    fn dirs() -> Dirs {
        let root = TempDir::new().unwrap();
        let work = root.path().join("work");
        let output = root.path().join("clips");
        Dirs {
            _root: root,
            work,
            output,
        }
    }

    fn config(dirs: &Dirs) -> PipelineConfig {
        PipelineConfig {
            work_dir: dirs.work.clone(),
            output_dir: dirs.output.clone(),
            ..PipelineConfig::default()
        }
    }

    fn url_request(clips_count: i64, max_duration: i64, platform: &str) -> ClipRequest {
        ClipRequest {
            source: JobSource::Url("https://www.youtube.com/watch?v=abc".to_string()),
            clips_count,
            max_duration,
            platform: platform.to_string(),
        }
    }

    fn fetcher() -> MockVideoFetcher {
        let mut fetcher = MockVideoFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_, dir| {
            let path = dir.join(SOURCE_FILE_NAME);
            std::fs::write(&path, b"video").unwrap();
            Ok(path)
        });
        fetcher
    }

    fn media_with_duration(duration: f64) -> MockMediaEngine {
        let mut media = MockMediaEngine::new();
        media.expect_duration().returning(move |_| Ok(duration));
        media
    }

    fn write_clip(spec: &autoclip_media::ClipRenderSpec) {
        std::fs::write(&spec.output, b"clip").unwrap();
    }

    fn processor(config: PipelineConfig, fetcher: MockVideoFetcher, media: MockMediaEngine) -> ClipJobProcessor {
        ClipJobProcessor::new(config, Collaborators::new(Arc::new(fetcher), Arc::new(media), None))
    }

    fn dir_entries(path: &Path) -> usize {
        std::fs::read_dir(path).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_zero_clips_is_rejected_before_any_io() {
        let dirs = dirs();
        let mut fetcher = MockVideoFetcher::new();
        fetcher.expect_fetch().times(0);
        let mut media = MockMediaEngine::new();
        media.expect_duration().times(0);
        media.expect_render().times(0);

        let result = processor(config(&dirs), fetcher, media)
            .submit_job(url_request(0, 30, "youtube"))
            .await;

        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
        assert!(!dirs.work.exists());
    }

    #[tokio::test]
    async fn test_short_max_duration_is_rejected() {
        let dirs = dirs();
        let result = processor(config(&dirs), MockVideoFetcher::new(), MockMediaEngine::new())
            .submit_job(url_request(3, 4, "youtube"))
            .await;
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn test_bad_url_is_rejected_before_fetch() {
        let dirs = dirs();
        let mut request = url_request(3, 30, "youtube");
        request.source = JobSource::Url("file:///etc/passwd".to_string());

        let result = processor(config(&dirs), MockVideoFetcher::new(), MockMediaEngine::new())
            .submit_job(request)
            .await;
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn test_uniform_job_end_to_end() {
        let dirs = dirs();
        let mut media = media_with_duration(100.0);
        media
            .expect_render()
            .times(3)
            .withf(|spec| spec.captions.is_none() && spec.frame.is_portrait())
            .returning(|spec| {
                write_clip(&spec);
                Ok(())
            });

        let output = processor(config(&dirs), fetcher(), media)
            .submit_job(url_request(3, 30, "tiktok"))
            .await
            .unwrap();

        let clips = &output.clips;
        assert_eq!(clips.len(), 3);
        let windows: Vec<(u32, f64, f64)> = clips.iter().map(|c| (c.id, c.start, c.end)).collect();
        assert_eq!(windows[0], (1, 0.0, 30.0));
        assert_eq!(windows[1].0, 2);
        assert!((windows[1].1 - 100.0 / 3.0).abs() < 1e-9);
        assert!((windows[2].2 - (200.0 / 3.0 + 30.0)).abs() < 1e-9);

        for clip in clips {
            assert_eq!(clip.platform, "tiktok");
            let file = format!("{}_clip_{}.mp4", output.job_id, clip.id);
            assert_eq!(clip.download_url, format!("/clips/{}", file));
            assert!(dirs.output.join(&file).exists());
        }

        // Job directory is gone
        assert_eq!(dir_entries(&dirs.work), 0);
    }

    #[tokio::test]
    async fn test_transcript_drives_selection_and_captions() {
        let dirs = dirs();
        let mut config = config(&dirs);
        config.transcription_enabled = true;

        let mut media = media_with_duration(120.0);
        media.expect_extract_audio().times(1).returning(|_, _| Ok(()));
        media.expect_render().times(2).returning(|spec| {
            if spec.start == 59.0 {
                let srt = std::fs::read_to_string(spec.captions.as_ref().unwrap()).unwrap();
                assert!(srt.starts_with("1\n00:00:01,000 --> 00:00:02,000\nfast talk here now\n"));
            } else {
                assert!(spec.captions.is_some());
            }
            write_clip(&spec);
            Ok(())
        });

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().times(1).returning(|_| {
            Ok(vec![
                TranscriptSegment::new("slow", 10.0, 14.0),
                TranscriptSegment::new("fast talk here now", 60.0, 61.0),
                TranscriptSegment::new("zero", 80.0, 80.0),
            ])
        });

        let processor = ClipJobProcessor::new(
            config,
            Collaborators::new(Arc::new(fetcher()), Arc::new(media), Some(Arc::new(transcriber))),
        );
        let clips = processor.submit_job(url_request(5, 20, "youtube")).await.unwrap().clips;

        let windows: Vec<(u32, f64, f64)> = clips.iter().map(|c| (c.id, c.start, c.end)).collect();
        assert_eq!(windows, vec![(1, 59.0, 79.0), (2, 9.0, 29.0)]);
    }

    #[tokio::test]
    async fn test_transcription_failure_is_not_fatal() {
        let dirs = dirs();
        let mut media = media_with_duration(40.0);
        media.expect_extract_audio().returning(|_, _| Ok(()));
        media.expect_render().times(2).returning(|spec| {
            write_clip(&spec);
            Ok(())
        });

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(|_| Err(MediaError::transcription_failed("model missing")));

        let processor = ClipJobProcessor::new(
            config(&dirs),
            Collaborators::new(Arc::new(fetcher()), Arc::new(media), Some(Arc::new(transcriber))),
        );
        let clips = processor.submit_job(url_request(2, 10, "youtube")).await.unwrap().clips;

        assert_eq!(clips[0].start, 0.0);
        assert_eq!(clips[1].start, 20.0);
    }

    #[tokio::test]
    async fn test_zero_duration_is_invalid_media() {
        let dirs = dirs();
        let mut media = media_with_duration(0.0);
        media.expect_render().times(0);

        let result = processor(config(&dirs), fetcher(), media)
            .submit_job(url_request(3, 30, "youtube"))
            .await;

        assert!(matches!(result, Err(PipelineError::InvalidMedia(_))));
        assert_eq!(dir_entries(&dirs.work), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure() {
        let dirs = dirs();
        let mut fetcher = MockVideoFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Err(MediaError::download_failed("private video")));

        let result = processor(config(&dirs), fetcher, MockMediaEngine::new())
            .submit_job(url_request(3, 30, "youtube"))
            .await;

        assert!(matches!(result, Err(PipelineError::Fetch(_))));
        assert_eq!(dir_entries(&dirs.work), 0);
    }

    #[tokio::test]
    async fn test_abort_policy_publishes_nothing() {
        let dirs = dirs();
        let mut media = media_with_duration(90.0);
        media.expect_render().times(2).returning(|spec| {
            if spec.output.ends_with("clip_2.mp4") {
                return Err(MediaError::ffmpeg_failed("encode failed", None, Some(1)));
            }
            write_clip(&spec);
            Ok(())
        });

        let result = processor(config(&dirs), fetcher(), media)
            .submit_job(url_request(3, 30, "youtube"))
            .await;

        assert!(matches!(result, Err(PipelineError::Render { moment_id: 2, .. })));
        assert_eq!(dir_entries(&dirs.output), 0);
        assert_eq!(dir_entries(&dirs.work), 0);
    }

    #[tokio::test]
    async fn test_skip_policy_omits_failed_clip() {
        let dirs = dirs();
        let mut config = config(&dirs);
        config.render_failure_policy = RenderFailurePolicy::Skip;

        let mut media = media_with_duration(90.0);
        media.expect_render().times(3).returning(|spec| {
            if spec.output.ends_with("clip_2.mp4") {
                return Err(MediaError::ffmpeg_failed("encode failed", None, Some(1)));
            }
            write_clip(&spec);
            Ok(())
        });

        let clips = processor(config, fetcher(), media)
            .submit_job(url_request(3, 30, "youtube"))
            .await
            .unwrap()
            .clips;

        let ids: Vec<u32> = clips.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(dir_entries(&dirs.output), 2);
    }

    #[tokio::test]
    async fn test_skip_policy_fails_when_every_clip_fails() {
        let dirs = dirs();
        let mut config = config(&dirs);
        config.render_failure_policy = RenderFailurePolicy::Skip;

        let mut media = media_with_duration(90.0);
        media
            .expect_render()
            .times(3)
            .returning(|_| Err(MediaError::ffmpeg_failed("encode failed", None, Some(1))));

        let result = processor(config, fetcher(), media)
            .submit_job(url_request(3, 30, "youtube"))
            .await;

        assert!(matches!(result, Err(PipelineError::Render { moment_id: 3, .. })));
        assert_eq!(dir_entries(&dirs.output), 0);
        assert_eq!(dir_entries(&dirs.work), 0);
    }

    #[tokio::test]
    async fn test_upload_source_skips_fetcher() {
        let dirs = dirs();
        let mut fetcher = MockVideoFetcher::new();
        fetcher.expect_fetch().times(0);

        let mut media = MockMediaEngine::new();
        media
            .expect_duration()
            .withf(|path| path.file_name().map_or(false, |n| n == "upload.mov"))
            .returning(|_| Ok(12.0));
        media.expect_render().times(1).returning(|spec| {
            write_clip(&spec);
            Ok(())
        });

        let request = ClipRequest {
            source: JobSource::Upload {
                bytes: Bytes::from_static(b"not really a video"),
                filename: "My Holiday.MOV".to_string(),
            },
            clips_count: 1,
            max_duration: 30,
            platform: "instagram".to_string(),
        };

        let clips = processor(config(&dirs), fetcher, media).submit_job(request).await.unwrap().clips;
        assert_eq!(clips.len(), 1);
        assert_eq!((clips[0].start, clips[0].end), (0.0, 12.0));
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let dirs = dirs();
        let request = ClipRequest {
            source: JobSource::Upload {
                bytes: Bytes::new(),
                filename: "a.mp4".to_string(),
            },
            clips_count: 1,
            max_duration: 30,
            platform: "youtube".to_string(),
        };

        let result = processor(config(&dirs), MockVideoFetcher::new(), MockMediaEngine::new())
            .submit_job(request)
            .await;
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn test_fixed_step_policy() {
        let dirs = dirs();
        let mut config = config(&dirs);
        config.selection_policy = SelectionPolicy::FixedStep;

        let mut media = media_with_duration(25.0);
        media.expect_render().times(3).returning(|spec| {
            write_clip(&spec);
            Ok(())
        });

        let clips = processor(config, fetcher(), media)
            .submit_job(url_request(10, 10, "youtube"))
            .await
            .unwrap()
            .clips;

        let windows: Vec<(f64, f64)> = clips.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(windows, vec![(0.0, 10.0), (10.0, 20.0), (20.0, 25.0)]);
    }

    #[test]
    fn test_upload_file_name() {
        assert_eq!(upload_file_name("clip.MP4"), "upload.mp4");
        assert_eq!(upload_file_name("noext"), "upload.mp4");
        assert_eq!(upload_file_name("../../etc/passwd"), "upload.mp4");
        assert_eq!(upload_file_name("weird.m p4"), "upload.mp4");
        assert_eq!(upload_file_name("video.webm"), "upload.webm");
    }
}
