//! Shared data models for the AutoClip backend.
//!
//! This crate provides Serde-serializable types for:
//! - Transcript segments and scored candidates
//! - Moments and rendered clip records
//! - Target platforms and frame sizes
//! - Encoding configuration
//! - Job identifiers and lifecycle stages
//! - SRT timecode formatting

pub mod encoding;
pub mod job;
pub mod moment;
pub mod platform;
pub mod timestamp;
pub mod transcript;

// Re-export common types
pub use encoding::EncodingConfig;
pub use job::{JobId, JobStage};
pub use moment::{ClipResult, Moment};
pub use platform::{FrameSize, Platform};
pub use timestamp::format_timecode;
pub use transcript::{ScoredCandidate, TranscriptSegment};
