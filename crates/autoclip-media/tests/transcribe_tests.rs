//! Whisper CLI invocation tests.
//!
//! A stand-in `whisper` script is put first on `PATH`. It echoes its
//! arguments into the JSON transcript; for `slow.wav` it sleeps first and
//! then touches `<audio>.done`.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use tempfile::TempDir;

use autoclip_media::{transcribe_audio, MediaError, WhisperOptions};

const FAKE_WHISPER: &str = r#"#!/bin/sh
# args: <audio> --model <m> --output_format json --output_dir <dir> --verbose False [--language <l>]
case "$1" in *slow.wav) sleep 3; touch "$1.done" ;; esac
stem=$(basename "$1" .wav)
printf '{"segments":[{"start":0.0,"end":1.0,"text":"%s"}]}' "$*" > "$7/$stem.json"
"#;

fn install_fake_whisper() {
    static BIN_DIR: OnceLock<TempDir> = OnceLock::new();

    BIN_DIR.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("whisper");
        std::fs::write(&script, FAKE_WHISPER).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let path = std::env::var("PATH").unwrap_or_default();
        std::env::set_var("PATH", format!("{}:{}", dir.path().display(), path));
        dir
    });
}

fn audio_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"RIFF").unwrap();
    path
}

#[tokio::test]
async fn test_model_and_language_reach_whisper() {
    install_fake_whisper();
    let dir = TempDir::new().unwrap();
    let audio = audio_file(dir.path(), "audio.wav");

    let options = WhisperOptions::default()
        .with_model("tiny")
        .with_language(Some("de".to_string()));
    let segments = transcribe_audio(&audio, &options).await.unwrap();

    assert_eq!(segments.len(), 1);
    let args = &segments[0].text;
    assert!(args.contains("--model tiny"), "args: {}", args);
    assert!(args.contains("--language de"), "args: {}", args);
    assert!(dir.path().join("audio.json").exists());
}

#[tokio::test]
async fn test_language_is_omitted_when_unset() {
    install_fake_whisper();
    let dir = TempDir::new().unwrap();
    let audio = audio_file(dir.path(), "plain.wav");

    let segments = transcribe_audio(&audio, &WhisperOptions::default()).await.unwrap();
    assert!(!segments[0].text.contains("--language"));
}

#[tokio::test]
async fn test_whisper_timeout_kills_process() {
    install_fake_whisper();
    let dir = TempDir::new().unwrap();
    let audio = audio_file(dir.path(), "slow.wav");

    let options = WhisperOptions::default().with_timeout(Some(1));
    let result = transcribe_audio(&audio, &options).await;
    assert!(matches!(result, Err(MediaError::Timeout(1))));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!dir.path().join("slow.wav.done").exists(), "whisper outlived its time limit");
}
