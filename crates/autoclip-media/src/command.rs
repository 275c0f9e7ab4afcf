//! FFmpeg invocation.
//!
//! [`FfmpegCommand`] assembles an argument list for one input and one output;
//! [`FfmpegRunner`] spawns it, streams `-progress` updates and turns a failed
//! exit into a [`MediaError`] carrying the tail of FFmpeg's diagnostics.
//! The other tools (ffprobe, yt-dlp, whisper) go through `run_tool`.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tracing::{debug, warn};

use autoclip_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

const STDERR_TAIL_LINES: usize = 20;

/// Arguments for a single-input, single-output FFmpeg run.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    /// Placed before `-i`
    pre_input: Vec<String>,
    /// Placed between the input and the output path
    post_input: Vec<String>,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            pre_input: Vec::new(),
            post_input: Vec::new(),
        }
    }

    fn flag(mut self, name: &str, value: impl Into<String>) -> Self {
        self.post_input.push(name.to_string());
        self.post_input.push(value.into());
        self
    }

    /// Restrict the input to `[start, start + length)`.
    ///
    /// Both options go before `-i`, so output timestamps start at zero and
    /// filters such as `subtitles` see clip-relative time.
    pub fn window(mut self, start: f64, length: f64) -> Self {
        self.pre_input.extend([
            "-ss".to_string(),
            format!("{:.3}", start),
            "-t".to_string(),
            format!("{:.3}", length),
        ]);
        self
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.flag("-vf", filter)
    }

    /// Apply an encoding profile (video codec, preset, CRF, audio codec and bitrate).
    pub fn encoding(self, encoding: &EncodingConfig) -> Self {
        self.flag("-c:v", encoding.codec.as_str())
            .flag("-preset", encoding.preset.as_str())
            .flag("-crf", encoding.crf.to_string())
            .flag("-c:a", encoding.audio_codec.as_str())
            .flag("-b:a", encoding.audio_bitrate.as_str())
    }

    /// Move the moov atom to the front for progressive playback.
    pub fn faststart(self) -> Self {
        self.flag("-movflags", "+faststart")
    }

    /// Audio-only output as signed 16-bit PCM.
    pub fn pcm_audio(mut self, sample_rate: u32, channels: u8) -> Self {
        self.post_input.push("-vn".to_string());
        self.flag("-c:a", "pcm_s16le")
            .flag("-ar", sample_rate.to_string())
            .flag("-ac", channels.to_string())
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-progress".to_string(),
            "pipe:2".to_string(),
        ];
        args.extend(self.pre_input.iter().cloned());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().into_owned());
        args.extend(self.post_input.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Spawns FFmpeg and waits for it, optionally under a wall-clock limit.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run `cmd`, calling `on_progress` for every completed progress block.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, on_progress: F) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr was not captured"))?;
        let reader = tokio::spawn(read_stderr(stderr, on_progress));

        let status = self.wait(&mut child).await;
        let diagnostics = reader.await.unwrap_or_default();

        match status? {
            s if s.success() => Ok(()),
            s => Err(MediaError::ffmpeg_failed(
                format!("FFmpeg exited with {}", s),
                (!diagnostics.is_empty()).then_some(diagnostics),
                s.code(),
            )),
        }
    }

    async fn wait(&self, child: &mut Child) -> MediaResult<ExitStatus> {
        let Some(secs) = self.timeout_secs else {
            return Ok(child.wait().await?);
        };

        match tokio::time::timeout(Duration::from_secs(secs), child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!("FFmpeg still running after {}s, killing it", secs);
                let _ = child.kill().await;
                Err(MediaError::Timeout(secs))
            }
        }
    }
}

/// Feed progress blocks to the callback and keep the last diagnostic lines.
async fn read_stderr<F>(stderr: ChildStderr, on_progress: F) -> String
where
    F: Fn(FfmpegProgress),
{
    let mut lines = BufReader::new(stderr).lines();
    let mut current = FfmpegProgress::default();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(snapshot) = current.apply_line(&line) {
            on_progress(snapshot);
            continue;
        }
        // key=value lines belong to an unfinished progress block
        if line.contains('=') || line.trim().is_empty() {
            continue;
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    Vec::from(tail).join("\n")
}

/// Run a one-shot tool to completion and collect its output.
///
/// The child is killed when `timeout_secs` elapses or when the returned
/// future is dropped, e.g. by a request timeout upstream.
pub(crate) async fn run_tool(mut cmd: Command, tool: &str, timeout_secs: Option<u64>) -> MediaResult<Output> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let run = cmd.output();
    let Some(secs) = timeout_secs else {
        return Ok(run.await?);
    };

    match tokio::time::timeout(Duration::from_secs(secs), run).await {
        Ok(output) => Ok(output?),
        Err(_) => {
            warn!("{} still running after {}s, killing it", tool, secs);
            Err(MediaError::Timeout(secs))
        }
    }
}

fn locate(tool: &str, missing: MediaError) -> MediaResult<PathBuf> {
    which::which(tool).map_err(|_| missing)
}

pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    locate("ffmpeg", MediaError::FfmpegNotFound)
}

pub fn check_ffprobe() -> MediaResult<PathBuf> {
    locate("ffprobe", MediaError::FfprobeNotFound)
}

pub fn check_ytdlp() -> MediaResult<PathBuf> {
    locate("yt-dlp", MediaError::YtDlpNotFound)
}

pub fn check_whisper() -> MediaResult<PathBuf> {
    locate("whisper", MediaError::WhisperNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_precedes_input() {
        let args = FfmpegCommand::new("in.mp4", "out.mp4").window(5.5, 30.0).build_args();
        let joined = args.join(" ");

        assert!(joined.contains("-ss 5.500 -t 30.000 -i in.mp4"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_encoding_profile() {
        let joined = FfmpegCommand::new("in.mp4", "out.mp4")
            .encoding(&EncodingConfig::default())
            .faststart()
            .build_args()
            .join(" ");

        assert!(joined.contains("-c:v libx264 -preset fast -crf 23 -c:a aac -b:a 128k"));
        assert!(joined.ends_with("-movflags +faststart out.mp4"));
    }

    #[test]
    fn test_pcm_audio_args() {
        let joined = FfmpegCommand::new("in.mp4", "out.wav")
            .pcm_audio(16_000, 1)
            .build_args()
            .join(" ");

        assert!(joined.contains("-vn -c:a pcm_s16le -ar 16000 -ac 1"));
    }

    #[test]
    fn test_overwrite_and_progress_flags_lead() {
        let args = FfmpegCommand::new("a", "b").build_args();
        assert_eq!(&args[..5], ["-y", "-v", "error", "-progress", "pipe:2"]);
    }
}
