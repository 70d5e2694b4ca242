//! The per-job state machine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::{debug, info, instrument, warn};

use super::context::PipelineContext;
use super::job::Job;
use super::outcome::{JobOutcome, JobReport};
use crate::checkpoint::CheckpointStore;
use crate::config::BatchConfig;
use crate::error::{ContourError, ContourResult};
use crate::gateway::{BoxFuture, ToolGateway};
use crate::scheduler::JobProcessor;
use crate::stages::{self, remove_file_if_exists};
use crate::units::UnitSystem;

/// Runs the stage pipeline for single jobs.
///
/// One runner is shared by all workers of a batch; it holds no per-job
/// state. Per-job state lives in a [`PipelineContext`] created for each run.
pub struct PipelineRunner {
    config: Arc<BatchConfig>,
    gateway: Arc<dyn ToolGateway>,
    checkpoint: Arc<CheckpointStore>,
}

impl PipelineRunner {
    pub fn new(
        config: Arc<BatchConfig>,
        gateway: Arc<dyn ToolGateway>,
        checkpoint: Arc<CheckpointStore>,
    ) -> Self {
        Self {
            config,
            gateway,
            checkpoint,
        }
    }

    /// Processes one job to a terminal outcome.
    ///
    /// Never returns an error: job-scoped failures become
    /// [`JobOutcome::Failed`].
    #[instrument(skip(self, job), fields(job = %job.id))]
    pub async fn run(&self, job: Job) -> JobReport {
        let clock = Instant::now();
        let started = Local::now();

        if let Some(first) = &job.name_taken_by {
            let error = ContourError::NameCollision {
                name: job.source_name(),
                first: first.to_string(),
            };
            warn!(error = %error, "Job failed");
            return JobReport::new(job, JobOutcome::Failed(error), clock.elapsed());
        }

        if self.checkpoint.is_processed(job.id.as_str()).await {
            debug!("Already processed, skipping");
            return JobReport::new(job, JobOutcome::Skipped, clock.elapsed());
        }

        debug!(source = %job.source.display(), "Processing");

        let mut context = PipelineContext::new();
        let result = self.execute(&job, &mut context).await;
        if result.is_err() {
            context.discard_packages();
        }
        context.cleanup().await;

        let outcome = match result {
            Ok(outputs) => self.finish(&job, outputs, started).await,
            Err(e) => JobOutcome::Failed(e),
        };

        if let JobOutcome::Failed(e) = &outcome {
            warn!(error = %e, "Job failed");
        }

        JobReport::new(job, outcome, clock.elapsed())
    }

    /// Runs every stage and returns the retained packages.
    async fn execute(&self, job: &Job, context: &mut PipelineContext) -> ContourResult<Vec<PathBuf>> {
        let gateway = self.gateway.as_ref();
        let config = self.config.as_ref();
        let settings = &config.settings;
        let name = job.source_name();

        let info = stages::read_metadata(gateway, &job.source).await?;
        let epsg = stages::resolve_epsg(&info, &job.source)?;

        let vrt = context.track(config.temp_path(&format!("{}.vrt", name)));
        stages::build_vrt(gateway, &job.source, &vrt).await?;

        let warped = context.track(config.temp_path(&format!("{}_warped.vrt", name)));
        stages::reproject(gateway, settings, &vrt, &warped, epsg).await?;

        let mut contours: Vec<(UnitSystem, PathBuf)> = Vec::with_capacity(settings.units.len());
        for &unit in &settings.units {
            let raster = if unit.needs_rescale() {
                let scaled = context.track(config.temp_path(&format!("{}_{}.vrt", name, unit)));
                stages::convert_units(gateway, &warped, &scaled).await?;
                scaled
            } else {
                warped.clone()
            };

            let geojson =
                context.track(config.temp_path(&format!("{}_{}_contour.geojson", name, unit)));
            stages::extract_contours(gateway, settings, unit, &raster, &geojson).await?;
            contours.push((unit, geojson));
        }

        let mut outputs = Vec::new();
        for (unit, geojson) in contours {
            let output = context.track_package(config.output_path(&name, unit));
            let prefilter = config.prefilter_script_path(unit);
            let features =
                stages::package_tiles(gateway, settings, unit, &prefilter, &geojson, &output)
                    .await?;
            if features.is_some() {
                outputs.push(output);
            }
        }

        Ok(outputs)
    }

    /// Records a finished job and optionally removes its source.
    async fn finish(&self, job: &Job, outputs: Vec<PathBuf>, started: DateTime<Local>) -> JobOutcome {
        let empty = outputs.is_empty();

        if let Err(e) = self
            .checkpoint
            .record(job.id.as_str(), outputs.first().map(PathBuf::as_path), started, empty)
            .await
        {
            return JobOutcome::Failed(ContourError::from(e));
        }

        if empty {
            info!("No contour lines (flat area)");
        }

        if self.config.delete_source {
            match remove_file_if_exists(&job.source).await {
                Ok(()) => debug!(source = %job.source.display(), "Removed source file"),
                Err(e) => warn!(error = %e, "Failed to remove source file"),
            }
        }

        if empty {
            JobOutcome::Empty
        } else {
            JobOutcome::Completed { outputs }
        }
    }
}

impl JobProcessor for PipelineRunner {
    fn process<'a>(&'a self, job: Job) -> BoxFuture<'a, JobReport> {
        Box::pin(self.run(job))
    }
}
