//! Transcript density scoring.

use autoclip_models::{ScoredCandidate, TranscriptSegment};

/// Rank transcript segments by words per second.
///
/// Segments without a positive finite span are dropped before scoring.
/// Ties keep their transcript order.
pub fn score_segments(segments: &[TranscriptSegment]) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = segments
        .iter()
        .filter(|seg| seg.is_well_formed())
        .map(|seg| ScoredCandidate {
            start: seg.start,
            end: seg.end,
            score: seg.word_count() as f64 / seg.span(),
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_span_is_excluded() {
        let segments = vec![
            TranscriptSegment::new("a b c", 5.0, 5.0),
            TranscriptSegment::new("a b", 0.0, 2.0),
        ];

        let scored = score_segments(&segments);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].start, 0.0);
        assert_eq!(scored[0].end, 2.0);
        assert_eq!(scored[0].score, 1.0);
    }

    #[test]
    fn test_sorted_by_density() {
        let segments = vec![
            TranscriptSegment::new("one", 0.0, 4.0),
            TranscriptSegment::new("one two three four", 10.0, 12.0),
            TranscriptSegment::new("one two", 20.0, 22.0),
        ];

        let starts: Vec<f64> = score_segments(&segments).iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![10.0, 20.0, 0.0]);
    }

    #[test]
    fn test_ties_keep_transcript_order() {
        let segments = vec![
            TranscriptSegment::new("a b", 30.0, 32.0),
            TranscriptSegment::new("c d", 1.0, 3.0),
            TranscriptSegment::new("e f g h", 50.0, 52.0),
        ];

        let starts: Vec<f64> = score_segments(&segments).iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![50.0, 30.0, 1.0]);
    }

    #[test]
    fn test_malformed_and_empty_input() {
        assert!(score_segments(&[]).is_empty());

        let segments = vec![
            TranscriptSegment::new("backwards", 9.0, 3.0),
            TranscriptSegment::new("nan", f64::NAN, 3.0),
        ];
        assert!(score_segments(&segments).is_empty());
    }

    #[test]
    fn test_empty_text_scores_zero() {
        let scored = score_segments(&[TranscriptSegment::new("   ", 0.0, 1.0)]);
        assert_eq!(scored[0].score, 0.0);
    }
}
