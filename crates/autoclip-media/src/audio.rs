//! Audio extraction for transcription.

use std::path::Path;
use tracing::info;

use autoclip_models::encoding::TRANSCRIPTION_SAMPLE_RATE;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Extract a 16 kHz mono PCM WAV track from a video.
pub async fn extract_audio(video_path: impl AsRef<Path>, audio_path: impl AsRef<Path>) -> MediaResult<()> {
    let video_path = video_path.as_ref();
    let audio_path = audio_path.as_ref();

    info!(
        "Extracting audio: {} -> {}",
        video_path.display(),
        audio_path.display()
    );

    let cmd = build_extract_command(video_path, audio_path);
    FfmpegRunner::new().run(&cmd).await
}

fn build_extract_command(video_path: &Path, audio_path: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video_path, audio_path)
        .pcm_audio(TRANSCRIPTION_SAMPLE_RATE, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_command_targets_whisper_format() {
        let args = build_extract_command(Path::new("v.mp4"), Path::new("a.wav")).build_args();
        assert!(args.contains(&"pcm_s16le".to_string()));
        assert!(args.contains(&"16000".to_string()));
        assert_eq!(args.last().unwrap(), "a.wav");
    }
}
