//! Terminal job outcomes.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ContourError;

use super::job::Job;

/// Terminal state of one job.
#[derive(Debug)]
pub enum JobOutcome {
    /// Already processed in an earlier run; nothing was executed.
    Skipped,

    /// Packages with features were written and recorded.
    Completed {
        /// Retained packages, in unit order.
        outputs: Vec<PathBuf>,
    },

    /// No unit system produced features; recorded as empty.
    Empty,

    /// A stage or the checkpoint failed; nothing was recorded.
    Failed(ContourError),
}

impl JobOutcome {
    /// Short label for progress lines.
    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Skipped => "skipped",
            JobOutcome::Completed { .. } => "completed",
            JobOutcome::Empty => "empty",
            JobOutcome::Failed(_) => "failed",
        }
    }

    /// Returns true if the job produced at least one package.
    pub fn has_output(&self) -> bool {
        matches!(self, JobOutcome::Completed { outputs } if !outputs.is_empty())
    }
}

/// What a runner reports to the scheduler for one job.
#[derive(Debug)]
pub struct JobReport {
    pub job: Job,
    pub outcome: JobOutcome,

    /// Time from job start until cleanup and checkpointing finished.
    pub duration: Duration,
}

impl JobReport {
    pub fn new(job: Job, outcome: JobOutcome, duration: Duration) -> Self {
        Self {
            job,
            outcome,
            duration,
        }
    }
}
