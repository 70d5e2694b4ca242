//! Bounded-concurrency batch scheduler.
//!
//! The scheduler feeds jobs from one shared queue to a fixed pool of N
//! workers, where N is the configured concurrency capped by the number of
//! jobs. Each worker pulls its next job as soon as it finishes one, so at
//! most N jobs are in flight at any time. Reports flow back over a channel
//! and are aggregated into a [`BatchResult`]:
//!
//! ```text
//!              ┌──────────┐
//!  VecDeque ──►│ worker 1 │──┐
//!  (shared) ──►│ worker 2 │──┼──► mpsc ──► aggregator ──► BatchResult
//!           ──►│ worker N │──┘                 │
//!              └──────────┘                    └──► progress callback
//! ```
//!
//! The batch ends only after every worker has terminated. The optional
//! merge stage runs after that barrier, never concurrently with jobs.

mod pool;
mod result;

pub use pool::{BatchScheduler, ProgressCallback, ProgressUpdate};
pub use result::BatchResult;

use crate::gateway::BoxFuture;
use crate::pipeline::{Job, JobReport};

/// Processes one job to a terminal report.
///
/// The seam between the scheduler and the pipeline. Implementations must
/// report every job they are given and must not fail; job-scoped errors are
/// part of the report.
pub trait JobProcessor: Send + Sync + 'static {
    fn process<'a>(&'a self, job: Job) -> BoxFuture<'a, JobReport>;
}
