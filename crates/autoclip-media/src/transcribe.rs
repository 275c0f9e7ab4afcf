//! Speech-to-text through the Whisper CLI.
//!
//! The CLI is run with `--output_format json`; its JSON carries a
//! `segments` array of `{start, end, text}` objects which map directly
//! onto [`TranscriptSegment`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use autoclip_models::TranscriptSegment;

use crate::command::{check_whisper, run_tool};
use crate::error::{MediaError, MediaResult};

/// Default Whisper model.
pub const DEFAULT_WHISPER_MODEL: &str = "base";

/// Whisper CLI options.
#[derive(Debug, Clone)]
pub struct WhisperOptions {
    /// Model name (tiny, base, small, medium, large)
    pub model: String,
    /// Spoken language; auto-detected when unset
    pub language: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for WhisperOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_WHISPER_MODEL.to_string(),
            language: None,
            timeout_secs: None,
        }
    }
}

impl WhisperOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<TranscriptSegment>,
}

/// Transcribe an audio file into timed segments.
pub async fn transcribe_audio(
    audio_path: impl AsRef<Path>,
    options: &WhisperOptions,
) -> MediaResult<Vec<TranscriptSegment>> {
    let audio_path = audio_path.as_ref();

    if !audio_path.exists() {
        return Err(MediaError::FileNotFound(audio_path.to_path_buf()));
    }

    check_whisper()?;

    // The JSON lands next to the audio, inside the job directory
    let output_dir = audio_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    info!(
        audio = %audio_path.display(),
        model = %options.model,
        "Transcribing audio"
    );

    let mut cmd = Command::new("whisper");
    cmd.arg(audio_path)
        .args(["--model", &options.model])
        .args(["--output_format", "json"])
        .arg("--output_dir")
        .arg(&output_dir)
        .args(["--verbose", "False"]);
    if let Some(lang) = &options.language {
        cmd.args(["--language", lang]);
    }
    let output = run_tool(cmd, "whisper", options.timeout_secs).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("whisper stderr: {}", stderr);
        let last = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("Unknown error");
        return Err(MediaError::transcription_failed(format!("whisper failed: {}", last)));
    }

    let json_path = whisper_output_path(audio_path, &output_dir);
    let raw = tokio::fs::read(&json_path).await.map_err(|e| {
        MediaError::transcription_failed(format!("missing output {}: {}", json_path.display(), e))
    })?;

    let segments = parse_whisper_json(&raw)?;
    info!("Transcribed {} segments", segments.len());
    Ok(segments)
}

/// Whisper names its output after the input file stem.
fn whisper_output_path(audio_path: &Path, output_dir: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    output_dir.join(format!("{}.json", stem))
}

fn parse_whisper_json(raw: &[u8]) -> MediaResult<Vec<TranscriptSegment>> {
    let parsed: WhisperOutput = serde_json::from_slice(raw)?;
    Ok(parsed.segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whisper_json() {
        let raw = br#"{
            "text": " Hello there. General Kenobi.",
            "language": "en",
            "segments": [
                {"id": 0, "seek": 0, "start": 0.0, "end": 2.5, "text": " Hello there.", "tokens": [1, 2]},
                {"id": 1, "seek": 0, "start": 2.5, "end": 4.0, "text": " General Kenobi."}
            ]
        }"#;

        let segments = parse_whisper_json(raw).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, " Hello there.");
        assert_eq!(segments[1].start, 2.5);
        assert_eq!(segments[1].end, 4.0);
    }

    #[test]
    fn test_parse_without_segments() {
        assert!(parse_whisper_json(br#"{"text": ""}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(matches!(parse_whisper_json(b"not json"), Err(MediaError::JsonParse(_))));
    }

    #[test]
    fn test_output_path_uses_stem() {
        let path = whisper_output_path(Path::new("/work/job/audio.wav"), Path::new("/work/job"));
        assert_eq!(path, PathBuf::from("/work/job/audio.json"));
    }

    #[tokio::test]
    async fn test_missing_audio() {
        let result = transcribe_audio("/definitely/not/here.wav", &WhisperOptions::default()).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
