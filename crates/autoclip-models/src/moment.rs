//! Moment and rendered clip models.

use serde::{Deserialize, Serialize};

/// A selected `[start, end)` window of the source video slated to become one clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    /// 1-based, contiguous within a job
    pub id: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl Moment {
    pub fn new(id: u32, start: f64, end: f64) -> Self {
        Self { id, start, end }
    }

    /// Window length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `[start, end]` lies entirely inside this window.
    pub fn contains(&self, start: f64, end: f64) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Externally visible record of a rendered clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipResult {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    /// Platform name as requested by the caller
    pub platform: String,
    /// Public URL the clip can be fetched from
    pub download_url: String,
}

impl ClipResult {
    /// Build the record for a rendered moment.
    pub fn from_moment(moment: &Moment, platform: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            id: moment.id,
            start: moment.start,
            end: moment.end,
            platform: platform.into(),
            download_url: download_url.into(),
        }
    }
}

/// Output file name for a clip of a job.
pub fn clip_file_name(job_id: &str, moment_id: u32) -> String {
    format!("{}_clip_{}.mp4", job_id, moment_id)
}

/// Whether `name` has the shape produced by [`clip_file_name`]:
/// `<hex job id>_clip_<id>.mp4`.
pub fn is_clip_file_name(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".mp4") else {
        return false;
    };
    let Some((job, id)) = stem.split_once("_clip_") else {
        return false;
    };
    !job.is_empty()
        && job.chars().all(|c| c.is_ascii_hexdigit())
        && !id.is_empty()
        && id.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive_on_both_bounds() {
        let moment = Moment::new(1, 10.0, 40.0);
        assert!(moment.contains(10.0, 40.0));
        assert!(moment.contains(12.0, 20.0));
        assert!(!moment.contains(9.9, 20.0));
        assert!(!moment.contains(30.0, 40.1));
    }

    #[test]
    fn test_clip_result_serializes_camel_case() {
        let moment = Moment::new(2, 1.0, 31.0);
        let clip = ClipResult::from_moment(&moment, "tiktok", "/clips/abcd1234_clip_2.mp4");
        let json = serde_json::to_value(&clip).unwrap();

        assert_eq!(json["id"], 2);
        assert_eq!(json["platform"], "tiktok");
        assert_eq!(json["downloadUrl"], "/clips/abcd1234_clip_2.mp4");
    }

    #[test]
    fn test_clip_file_name() {
        assert_eq!(clip_file_name("abcd1234", 3), "abcd1234_clip_3.mp4");
        assert!(is_clip_file_name(&clip_file_name("abcd1234", 12)));
        assert!(!is_clip_file_name("abcd1234_clip_.mp4"));
        assert!(!is_clip_file_name("notes_clip_1.mp4"));
        assert!(!is_clip_file_name("abcd1234_clip_1.mov"));
    }
}
