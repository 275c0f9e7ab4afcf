//! Structured job logging.
//!
//! Every job carries a [`JobLogger`] that stamps its log lines with the job
//! id and operation, and records stage transitions.

use tracing::{error, info, warn, Span};

use autoclip_models::{JobId, JobStage};

/// Job logger for structured logging with consistent fields.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: String,
    stage: JobStage,
}

impl JobLogger {
    /// Create a logger for `job_id` running `operation` (e.g. "clips_from_url").
    pub fn new(job_id: &JobId, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
            stage: JobStage::Created,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = %self.stage,
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = %self.stage,
            "Job progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = %self.stage,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = %self.stage,
            "Job error: {}", message
        );
    }

    /// Move to `next` and log the transition.
    ///
    /// Illegal transitions are logged and still applied; the stage is
    /// informational only.
    pub fn advance(&mut self, next: JobStage, detail: &str) {
        if !self.stage.can_transition_to(next) {
            warn!(
                job_id = %self.job_id,
                from = %self.stage,
                to = %next,
                "Unexpected job stage transition"
            );
        }

        let from = self.stage;
        self.stage = next;

        if next == JobStage::Failed {
            error!(
                job_id = %self.job_id,
                operation = %self.operation,
                from = %from,
                stage = %next,
                "Job failed: {}", detail
            );
        } else {
            info!(
                job_id = %self.job_id,
                operation = %self.operation,
                from = %from,
                stage = %next,
                "Job stage: {}", detail
            );
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn stage(&self) -> JobStage {
        self.stage
    }

    /// Tracing span carrying the job fields.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }
}
