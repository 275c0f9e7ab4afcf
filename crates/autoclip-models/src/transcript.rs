//! Transcript segment models.

use serde::{Deserialize, Serialize};

/// A timestamped piece of speech produced by the transcription engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Spoken text
    #[serde(default)]
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl TranscriptSegment {
    /// Create a new segment.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Segment length in seconds (may be zero or negative for malformed input).
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Number of whitespace-separated words in the text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether the segment has finite bounds with `start < end`.
    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start < self.end
    }
}

/// A transcript segment ranked by information density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub start: f64,
    pub end: f64,
    /// Words per second
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        let seg = TranscriptSegment::new("  hello   world \n again ", 0.0, 1.0);
        assert_eq!(seg.word_count(), 3);
    }

    #[test]
    fn test_well_formed() {
        assert!(TranscriptSegment::new("a", 0.0, 0.5).is_well_formed());
        assert!(!TranscriptSegment::new("a", 1.0, 1.0).is_well_formed());
        assert!(!TranscriptSegment::new("a", 2.0, 1.0).is_well_formed());
        assert!(!TranscriptSegment::new("a", 0.0, f64::NAN).is_well_formed());
    }

    #[test]
    fn test_deserialize_missing_text() {
        let seg: TranscriptSegment = serde_json::from_str(r#"{"start": 1.5, "end": 3.0}"#).unwrap();
        assert_eq!(seg.text, "");
        assert!((seg.span() - 1.5).abs() < 1e-9);
    }
}
