//! Clip encoding settings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
pub const DEFAULT_PRESET: &str = "fast";
/// Balanced for size and quality
pub const DEFAULT_CRF: u8 = 23;
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// ASS `force_style` for burned-in captions: yellow text on a translucent box.
pub const CAPTION_FORCE_STYLE: &str =
    "FontSize=24,PrimaryColour=&H00FFFF,OutlineColour=&H40000000,BorderStyle=3";

/// Sample rate the transcription engine expects.
pub const TRANSCRIPTION_SAMPLE_RATE: u32 = 16_000;

/// Encoder settings applied to every rendered clip.
///
/// Missing fields deserialize to the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub codec: String,
    pub preset: String,
    /// Constant Rate Factor, 0-51, lower is better
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.into(),
            preset: DEFAULT_PRESET.into(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.into(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.into(),
        }
    }
}
