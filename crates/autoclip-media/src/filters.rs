//! FFmpeg video filter construction.

use std::path::Path;

use autoclip_models::encoding::CAPTION_FORCE_STYLE;
use autoclip_models::FrameSize;

/// Fit the source into `frame` without distortion, letterboxing the rest.
pub fn frame_fit_filter(frame: FrameSize) -> String {
    let FrameSize { width, height } = frame;
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
        w = width,
        h = height
    )
}

/// Burn an SRT caption track into the video.
pub fn subtitles_filter(captions: &Path) -> String {
    format!(
        "subtitles='{}':force_style='{}'",
        escape_filter_path(&captions.to_string_lossy()),
        CAPTION_FORCE_STYLE
    )
}

/// Full filter chain for a rendered clip.
///
/// Captions are applied after framing so their placement follows the
/// output frame, not the source.
pub fn build_clip_filter(frame: FrameSize, captions: Option<&Path>) -> String {
    let fit = frame_fit_filter(frame);
    match captions {
        Some(path) => format!("{},{}", fit, subtitles_filter(path)),
        None => fit,
    }
}

/// Escape a path for use inside a quoted filtergraph argument.
fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "\\\\").replace('\'', "\\'").replace(':', "\\:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portrait_fit() {
        assert_eq!(
            frame_fit_filter(FrameSize::PORTRAIT),
            "scale=1080:1920:force_original_aspect_ratio=decrease,pad=1080:1920:(ow-iw)/2:(oh-ih)/2"
        );
    }

    #[test]
    fn test_clip_filter_without_captions() {
        let filter = build_clip_filter(FrameSize::LANDSCAPE, None);
        assert!(filter.starts_with("scale=1920:1080"));
        assert!(!filter.contains("subtitles"));
    }

    #[test]
    fn test_clip_filter_with_captions() {
        let filter = build_clip_filter(FrameSize::PORTRAIT, Some(Path::new("/tmp/job/clip_1.srt")));
        assert!(filter.contains(",subtitles='/tmp/job/clip_1.srt'"));
        assert!(filter.contains("force_style='FontSize=24"));
    }

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(escape_filter_path("C:\\a'b"), "C\\:\\\\a\\'b");
        assert_eq!(escape_filter_path("/plain/path.srt"), "/plain/path.srt");
    }
}
