//! Batch entry point.
//!
//! [`ContourBatch`] wires the components together for one invocation:
//!
//! 1. Pre-flight: every required tool must be installed (fatal otherwise)
//! 2. Create the output directory and prepare the checkpoint, deleting it
//!    first when starting over
//! 3. Write the tile prefilter scripts
//! 4. Schedule all jobs; merge afterwards when requested
//! 5. Remove the prefilter scripts and log a summary
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use terracontour::{BatchConfig, Concurrency, ContourBatch, ProcessGateway};
//!
//! let config = BatchConfig::new("/data/contours")
//!     .with_concurrency(Concurrency::new(4))
//!     .with_merge(true);
//! let gateway = Arc::new(ProcessGateway::new(None));
//!
//! let result = ContourBatch::new(config, gateway).run(dem_files).await?;
//! println!("{} succeeded, {} failed", result.succeeded, result.failed);
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::checkpoint::CheckpointStore;
use crate::config::BatchConfig;
use crate::error::{ContourError, ContourResult};
use crate::format::format_duration;
use crate::gateway::ToolGateway;
use crate::merge::MergeStage;
use crate::pipeline::{Job, PipelineRunner};
use crate::preflight;
use crate::scheduler::{BatchResult, BatchScheduler, ProgressCallback};
use crate::stages::{remove_prefilter_scripts, write_prefilter_scripts};

/// One batch invocation.
pub struct ContourBatch {
    config: Arc<BatchConfig>,
    gateway: Arc<dyn ToolGateway>,
    progress: Option<ProgressCallback>,
}

impl ContourBatch {
    pub fn new(config: BatchConfig, gateway: Arc<dyn ToolGateway>) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            progress: None,
        }
    }

    /// Observes every finished job.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// The batch configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Runs the batch over the given DEM files.
    ///
    /// Errors are returned only for failures before the first job starts.
    /// Job failures are counted in the returned [`BatchResult`].
    pub async fn run<I, P>(self, sources: I) -> ContourResult<BatchResult>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        preflight::check_tools(self.gateway.as_ref()).await?;

        let output_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| ContourError::io(output_dir, e))?;

        let checkpoint = Arc::new(
            CheckpointStore::prepare(self.config.checkpoint_path(), self.config.overwrite).await?,
        );

        write_prefilter_scripts(&self.config).await?;

        let jobs = Job::collect_unique(sources);
        let runner = PipelineRunner::new(
            Arc::clone(&self.config),
            Arc::clone(&self.gateway),
            checkpoint,
        );

        let mut scheduler = BatchScheduler::new(Arc::new(runner), self.config.concurrency);
        if self.config.merge {
            scheduler = scheduler.with_merge(MergeStage::new(
                Arc::clone(&self.config),
                Arc::clone(&self.gateway),
            ));
        }
        if let Some(callback) = self.progress {
            scheduler = scheduler.with_progress(callback);
        }

        let result = scheduler.run(jobs).await;

        if let Err(e) = remove_prefilter_scripts(&self.config).await {
            warn!(error = %e, "Failed to remove prefilter scripts");
        }

        info!(
            processed = result.succeeded,
            total = result.total,
            empty = result.empty,
            skipped = result.skipped,
            failed = result.failed,
            duration = %format_duration(result.duration),
            "Batch finished"
        );

        Ok(result)
    }
}
