//! Moment selection.
//!
//! Turns a source duration and ranked transcript candidates into the clip
//! windows to render. Two strategies are available behind [`MomentSelector`]:
//!
//! - [`DensityRankedSelector`] (default): the densest transcript segments,
//!   each with a one second lead-in, or evenly spaced windows when there is
//!   no usable transcript.
//! - [`FixedStepSelector`]: back-to-back windows of `max_duration` seconds
//!   from the start of the video, capped at twenty.

use serde::{Deserialize, Serialize};
use std::fmt;

use autoclip_models::{Moment, ScoredCandidate};

use crate::error::{PipelineError, PipelineResult};

/// Shortest accepted `max_duration`, in seconds.
pub const MIN_CLIP_DURATION_SECS: u32 = 5;

/// Context kept before a transcript candidate's start.
pub const LEAD_IN_SECS: f64 = 1.0;

/// Upper bound on clips produced by [`FixedStepSelector`].
pub const FIXED_STEP_MAX_CLIPS: u32 = 20;

/// Validated selection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionParams {
    clips_count: u32,
    max_duration: u32,
}

impl SelectionParams {
    /// Validate raw caller input.
    pub fn new(clips_count: i64, max_duration: i64) -> PipelineResult<Self> {
        if clips_count <= 0 {
            return Err(PipelineError::invalid_parameter(format!(
                "clipsCount must be positive, got {}",
                clips_count
            )));
        }
        if max_duration < i64::from(MIN_CLIP_DURATION_SECS) {
            return Err(PipelineError::invalid_parameter(format!(
                "maxDuration must be at least {} seconds, got {}",
                MIN_CLIP_DURATION_SECS, max_duration
            )));
        }

        let clips_count = u32::try_from(clips_count)
            .map_err(|_| PipelineError::invalid_parameter("clipsCount is too large"))?;
        let max_duration = u32::try_from(max_duration)
            .map_err(|_| PipelineError::invalid_parameter("maxDuration is too large"))?;

        Ok(Self {
            clips_count,
            max_duration,
        })
    }

    pub fn clips_count(&self) -> u32 {
        self.clips_count
    }

    pub fn max_duration(&self) -> u32 {
        self.max_duration
    }

    fn max_duration_secs(&self) -> f64 {
        f64::from(self.max_duration)
    }
}

/// Strategy that picks clip windows.
pub trait MomentSelector: Send + Sync {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Choose moments for a source of `duration` seconds.
    ///
    /// `candidates` must already be ranked, highest score first.
    fn select(
        &self,
        duration: f64,
        candidates: &[ScoredCandidate],
        params: &SelectionParams,
    ) -> PipelineResult<Vec<Moment>>;
}

/// Configured selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    DensityRanked,
    FixedStep,
}

impl SelectionPolicy {
    /// Parse a policy name as used in configuration.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "density_ranked" | "density" => Some(SelectionPolicy::DensityRanked),
            "fixed_step" | "fixed" => Some(SelectionPolicy::FixedStep),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::DensityRanked => "density_ranked",
            SelectionPolicy::FixedStep => "fixed_step",
        }
    }

    pub fn selector(&self) -> Box<dyn MomentSelector> {
        match self {
            SelectionPolicy::DensityRanked => Box::new(DensityRankedSelector),
            SelectionPolicy::FixedStep => Box::new(FixedStepSelector),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn ensure_duration(duration: f64) -> PipelineResult<()> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(PipelineError::invalid_media(format!(
            "source duration must be positive, got {}",
            duration
        )));
    }
    Ok(())
}

/// Transcript-driven selection with an even-spacing fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct DensityRankedSelector;

impl DensityRankedSelector {
    fn from_candidates(duration: f64, candidates: &[ScoredCandidate], params: &SelectionParams) -> Vec<Moment> {
        let max = params.max_duration_secs();

        candidates
            .iter()
            .take(params.clips_count as usize)
            .map(|c| (c.start - LEAD_IN_SECS).max(0.0))
            // Lead-in start past the end of the source cannot form a window
            .filter(|&start| start < duration)
            .zip(1u32..)
            .map(|(start, id)| {
                let end = duration.min(start + max);
                Moment::new(id, start, end)
            })
            .collect()
    }

    fn uniform(duration: f64, params: &SelectionParams) -> Vec<Moment> {
        let count = params.clips_count;
        let max = params.max_duration_secs();
        let segment_duration = duration / f64::from(count);

        (0..count)
            .map(|i| {
                let start = f64::from(i) * segment_duration;
                let end = (start + max).min(duration);
                Moment::new(i + 1, start, end)
            })
            .collect()
    }
}

impl MomentSelector for DensityRankedSelector {
    fn name(&self) -> &'static str {
        "density_ranked"
    }

    fn select(
        &self,
        duration: f64,
        candidates: &[ScoredCandidate],
        params: &SelectionParams,
    ) -> PipelineResult<Vec<Moment>> {
        ensure_duration(duration)?;

        let moments = Self::from_candidates(duration, candidates, params);
        if !moments.is_empty() {
            return Ok(moments);
        }

        Ok(Self::uniform(duration, params))
    }
}

/// Consecutive windows of `max_duration` from the start of the source.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStepSelector;

impl MomentSelector for FixedStepSelector {
    fn name(&self) -> &'static str {
        "fixed_step"
    }

    fn select(
        &self,
        duration: f64,
        _candidates: &[ScoredCandidate],
        params: &SelectionParams,
    ) -> PipelineResult<Vec<Moment>> {
        ensure_duration(duration)?;

        let step = params.max_duration_secs();
        let count = params.clips_count.min(FIXED_STEP_MAX_CLIPS);

        Ok((0..count)
            .map(|i| f64::from(i) * step)
            .take_while(|&start| start < duration)
            .zip(1u32..)
            .map(|(start, id)| Moment::new(id, start, (start + step).min(duration)))
            .collect())
    }
}
