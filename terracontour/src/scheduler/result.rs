//! Aggregate batch counters.

use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::{JobId, JobOutcome, JobReport};

/// Outcome counters of one batch.
///
/// `succeeded + failed + empty + skipped == total` once the batch finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Distinct jobs submitted.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub empty: usize,
    pub skipped: usize,

    /// Wall-clock duration of the whole batch, merge included.
    pub duration: Duration,

    /// Failed jobs with their error message.
    pub failures: Vec<(JobId, String)>,

    /// Consolidated packages written by the merge stage.
    pub merged: Vec<PathBuf>,
}

impl BatchResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Counts one finished job.
    pub fn record(&mut self, report: &JobReport) {
        match &report.outcome {
            JobOutcome::Skipped => self.skipped += 1,
            JobOutcome::Completed { .. } => self.succeeded += 1,
            JobOutcome::Empty => self.empty += 1,
            JobOutcome::Failed(e) => {
                self.failed += 1;
                self.failures.push((report.job.id.clone(), e.to_string()));
            }
        }
    }

    /// Jobs that reached a terminal state.
    pub fn finished(&self) -> usize {
        self.succeeded + self.failed + self.empty + self.skipped
    }

    /// Returns true if every submitted job has been counted.
    pub fn is_complete(&self) -> bool {
        self.finished() == self.total
    }

    /// Returns true if this batch wrote at least one real package.
    pub fn has_new_output(&self) -> bool {
        self.succeeded > 0
    }
}
