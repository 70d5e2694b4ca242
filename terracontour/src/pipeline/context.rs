//! Job-local artifact tracking.

use std::path::PathBuf;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::stages::remove_file_if_exists;

/// Intermediate artifacts created while processing one job.
///
/// A path is tracked before the stage that writes it runs, so a stage that
/// fails half-way still has its partial output cleaned up.
///
/// Packages are tracked separately: they survive cleanup unless the job
/// failed, in which case [`PipelineContext::discard_packages`] hands them
/// to cleanup as well.
#[derive(Debug, Default)]
pub struct PipelineContext {
    artifacts: Vec<PathBuf>,
    packages: Vec<PathBuf>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks an artifact path and hands it back.
    pub fn track(&mut self, path: PathBuf) -> PathBuf {
        self.artifacts.push(path.clone());
        path
    }

    /// Tracks a package written at its final path and hands it back.
    pub fn track_package(&mut self, path: PathBuf) -> PathBuf {
        self.packages.push(path.clone());
        path
    }

    /// Schedules every package of this run for removal.
    pub fn discard_packages(&mut self) {
        self.artifacts.append(&mut self.packages);
    }

    /// Tracked paths in creation order.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Deletes all tracked artifacts concurrently.
    ///
    /// Removal failures are logged; returns how many removals failed.
    pub async fn cleanup(self) -> usize {
        let results = join_all(self.artifacts.iter().map(|p| remove_file_if_exists(p))).await;

        let mut failed = 0;
        for (path, result) in self.artifacts.iter().zip(results) {
            if let Err(e) = result {
                warn!(path = %path.display(), error = %e, "Failed to remove intermediate file");
                failed += 1;
            }
        }

        debug!(artifacts = self.artifacts.len(), failed, "Cleaned up intermediate files");
        failed
    }
}
