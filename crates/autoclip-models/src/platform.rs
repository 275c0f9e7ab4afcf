//! Target platform and output frame definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Full HD landscape (16:9)
    pub const LANDSCAPE: FrameSize = FrameSize {
        width: 1920,
        height: 1080,
    };

    /// Full HD portrait (9:16) for short-form feeds
    pub const PORTRAIT: FrameSize = FrameSize {
        width: 1080,
        height: 1920,
    };

    /// Create a new frame size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Target platform, which decides the output framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Youtube,
    Instagram,
    Tiktok,
}

impl Platform {
    /// Resolve a platform name. Unknown names fall back to the landscape default.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "instagram" => Platform::Instagram,
            "tiktok" => Platform::Tiktok,
            _ => Platform::Youtube,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Output frame size for this platform.
    pub fn frame_size(&self) -> FrameSize {
        match self {
            Platform::Youtube => FrameSize::LANDSCAPE,
            Platform::Instagram | Platform::Tiktok => FrameSize::PORTRAIT,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
