//! Worker pool.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::result::BatchResult;
use super::JobProcessor;
use crate::config::Concurrency;
use crate::merge::MergeStage;
use crate::pipeline::{Job, JobReport};

/// One finished job, as seen by progress observers.
#[derive(Debug)]
pub struct ProgressUpdate<'a> {
    /// The job that just finished.
    pub report: &'a JobReport,

    /// Counters including this job.
    pub totals: &'a BatchResult,
}

/// Progress callback, invoked once per finished job.
pub type ProgressCallback = Box<dyn Fn(&ProgressUpdate<'_>) + Send + Sync>;

/// Runs jobs with bounded concurrency.
pub struct BatchScheduler {
    processor: Arc<dyn JobProcessor>,
    concurrency: Concurrency,
    merge: Option<MergeStage>,
    progress: Option<ProgressCallback>,
}

impl BatchScheduler {
    pub fn new(processor: Arc<dyn JobProcessor>, concurrency: Concurrency) -> Self {
        Self {
            processor,
            concurrency,
            merge: None,
            progress: None,
        }
    }

    /// Merges outputs after the workers drained, if any job produced one.
    pub fn with_merge(mut self, merge: MergeStage) -> Self {
        self.merge = Some(merge);
        self
    }

    /// Observes every finished job.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Runs every job exactly once and returns the aggregate result.
    pub async fn run(&self, jobs: Vec<Job>) -> BatchResult {
        let start = Instant::now();
        let mut result = BatchResult::new(jobs.len());

        if !jobs.is_empty() {
            self.drain(jobs, &mut result).await;
        }

        if let Some(merge) = &self.merge {
            if result.has_new_output() {
                result.merged = merge.run().await;
            } else {
                info!("Nothing new to merge");
            }
        }

        result.duration = start.elapsed();
        result
    }

    async fn drain(&self, jobs: Vec<Job>, result: &mut BatchResult) {
        let workers = self.concurrency.workers_for(jobs.len());
        info!(jobs = jobs.len(), workers, "Processing DEM files");

        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (tx, mut rx) = mpsc::unbounded_channel::<JobReport>();

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let queue = Arc::clone(&queue);
                let processor = Arc::clone(&self.processor);
                let tx = tx.clone();

                tokio::spawn(async move {
                    let mut processed = 0usize;
                    loop {
                        let next = queue.lock().pop_front();
                        let Some(job) = next else { break };

                        let report = processor.process(job).await;
                        processed += 1;
                        if tx.send(report).is_err() {
                            break;
                        }
                    }
                    debug!(worker, processed, "Worker finished");
                })
            })
            .collect();

        // Workers hold the only remaining senders; the loop ends when all
        // of them are gone.
        drop(tx);

        while let Some(report) = rx.recv().await {
            result.record(&report);
            self.report_progress(&report, result);
        }

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                error!(error = %e, "Worker terminated abnormally");
            }
        }

        // A panicking worker loses its job; count it so the totals add up.
        let lost = result.total - result.finished();
        if lost > 0 {
            error!(lost, "Jobs were lost by crashed workers");
            result.failed += lost;
        }
    }

    fn report_progress(&self, report: &JobReport, totals: &BatchResult) {
        info!(
            job = %report.job.source_name(),
            outcome = report.outcome.label(),
            duration_ms = duration_ms(report.duration),
            progress = totals.finished(),
            total = totals.total,
            skipped = totals.skipped,
            empty = totals.empty,
            failed = totals.failed,
            "Finished processing"
        );

        if let Some(callback) = &self.progress {
            callback(&ProgressUpdate { report, totals });
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
