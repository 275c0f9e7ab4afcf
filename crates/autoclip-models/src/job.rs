//! Job identity and lifecycle stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of the short job identifier.
const JOB_ID_LEN: usize = 8;

/// Unique identifier for a clip job.
///
/// Short random hex string; used to name the job's working directory
/// and its output clips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..JOB_ID_LEN].to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage of a clip job.
///
/// `Created → Fetched → (Transcribed | SkippedTranscription) → Selected →
/// Rendering → Done`, with any stage able to move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    #[default]
    Created,
    Fetched,
    Transcribed,
    SkippedTranscription,
    Selected,
    Rendering,
    Done,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Created => "created",
            JobStage::Fetched => "fetched",
            JobStage::Transcribed => "transcribed",
            JobStage::SkippedTranscription => "skipped_transcription",
            JobStage::Selected => "selected",
            JobStage::Rendering => "rendering",
            JobStage::Done => "done",
            JobStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Done | JobStage::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: JobStage) -> bool {
        use JobStage::*;

        if next == Failed {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Created, Fetched)
                | (Fetched, Transcribed)
                | (Fetched, SkippedTranscription)
                | (Transcribed, Selected)
                | (SkippedTranscription, Selected)
                | (Selected, Rendering)
                | (Rendering, Rendering)
                | (Rendering, Done)
        )
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
