//! Caption re-timing for a single clip.
//!
//! Only transcript segments lying entirely inside the clip window are
//! kept; their times are shifted so the clip starts at zero.

use std::fmt::Write as _;

use autoclip_models::{format_timecode, Moment, TranscriptSegment};

/// One caption cue, timed relative to its clip.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionCue {
    /// 1-based cue number
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Caption track for one clip. An empty track means no caption burn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionTrack {
    cues: Vec<CaptionCue>,
}

impl CaptionTrack {
    /// Re-base the segments that fall inside `window`.
    pub fn for_window(segments: &[TranscriptSegment], window: &Moment) -> Self {
        let cues = segments
            .iter()
            .filter(|seg| window.contains(seg.start, seg.end))
            .enumerate()
            .map(|(i, seg)| CaptionCue {
                index: i + 1,
                start: seg.start - window.start,
                end: seg.end - window.start,
                text: seg.text.trim().to_string(),
            })
            .collect();

        Self { cues }
    }

    pub fn cues(&self) -> &[CaptionCue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Render as SRT text.
    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for cue in &self.cues {
            // Writing to a String cannot fail
            let _ = write!(
                out,
                "{}\n{} --> {}\n{}\n\n",
                cue.index,
                format_timecode(cue.start),
                format_timecode(cue.end),
                cue.text
            );
        }
        out
    }
}
