//! Remote video fetch using yt-dlp.

use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

use crate::command::{check_ytdlp, run_tool};
use crate::error::{MediaError, MediaResult};

/// yt-dlp format selector: best single-file MP4.
const YTDLP_FORMAT: &str = "best[ext=mp4]";

/// Validate a source URL before any download work.
///
/// Only absolute `http`/`https` URLs with a host are accepted.
pub fn validate_source_url(raw: &str) -> MediaResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MediaError::InvalidUrl("URL is empty".to_string()));
    }

    let url = Url::parse(raw).map_err(|e| MediaError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(MediaError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(MediaError::InvalidUrl(format!("{} has no host", raw)));
    }

    Ok(url)
}

/// Download a video from URL using yt-dlp.
///
/// # Arguments
///
/// * `url` - Video URL (YouTube, Vimeo, direct MP4 link, ...)
/// * `output_path` - Path to save the downloaded video
/// * `timeout_secs` - Wall-clock limit; yt-dlp is killed when it elapses
///   or when this future is dropped
pub async fn download_video(
    url: &str,
    output_path: impl AsRef<Path>,
    timeout_secs: Option<u64>,
) -> MediaResult<()> {
    let output_path = output_path.as_ref();
    let url = validate_source_url(url)?;

    check_ytdlp()?;

    info!(url = %url, output = %output_path.display(), "Downloading video");

    let mut cmd = Command::new("yt-dlp");
    cmd.args(["--no-playlist", "--no-progress", "-f", YTDLP_FORMAT, "-o"])
        .arg(output_path)
        .arg(url.as_str());
    let output = run_tool(cmd, "yt-dlp", timeout_secs).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp stderr: {}", stderr);

        let error_msg = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("Unknown error");

        if stderr.contains("Unsupported URL") {
            warn!(url = %url, "yt-dlp does not support this source");
        }

        return Err(MediaError::download_failed(format!("yt-dlp failed: {}", error_msg)));
    }

    if !output_path.exists() {
        return Err(MediaError::download_failed("Output file not created"));
    }

    let file_size = output_path.metadata()?.len();
    info!(
        output = %output_path.display(),
        size_mb = file_size as f64 / (1024.0 * 1024.0),
        "Downloaded video successfully"
    );

    Ok(())
}
