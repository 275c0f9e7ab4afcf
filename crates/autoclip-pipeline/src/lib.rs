//! Clip job pipeline.
//!
//! This crate implements:
//! - Transcript density scoring
//! - Moment selection (density-ranked and fixed-step strategies)
//! - Caption re-timing into per-clip SRT tracks
//! - Per-moment clip rendering
//! - Job orchestration over pluggable fetch, media and transcription collaborators

pub mod captions;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod logging;
pub mod processor;
pub mod renderer;
pub mod scoring;
pub mod selection;

pub use captions::{CaptionCue, CaptionTrack};
pub use collaborators::{
    Collaborators, FfmpegEngine, MediaEngine, Transcriber, VideoFetcher, WhisperCliTranscriber, YtDlpFetcher,
};
pub use config::{PipelineConfig, RenderFailurePolicy};
pub use error::{PipelineError, PipelineResult};
pub use logging::JobLogger;
pub use processor::{ClipJobProcessor, ClipRequest, JobOutput, JobSource};
pub use renderer::ClipRenderer;
pub use scoring::score_segments;
pub use selection::{
    DensityRankedSelector, FixedStepSelector, MomentSelector, SelectionParams, SelectionPolicy,
};
