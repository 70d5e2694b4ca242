//! Per-batch configuration.

use std::path::PathBuf;

use super::settings::ContourSettings;
use crate::units::UnitSystem;

/// Well-known name of the checkpoint file inside the output directory.
pub const CHECKPOINT_FILE_NAME: &str = ".terrain-cli-contour-state.json";

/// Prefix for job-scoped temporary artifacts.
const TEMP_PREFIX: &str = "tmp_";

/// Number of jobs processed concurrently.
///
/// Always at least one. Non-positive or unparsable inputs coerce to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Concurrency(usize);

impl Concurrency {
    /// Creates a concurrency level, coercing values below one to one.
    pub fn new(value: i64) -> Self {
        Self(usize::try_from(value).unwrap_or(1).max(1))
    }

    /// Parses a command line value. Anything that is not a positive integer
    /// yields one.
    pub fn from_arg(value: &str) -> Self {
        value
            .trim()
            .parse::<i64>()
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Returns the configured level.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Number of workers to start for a batch of `jobs` jobs.
    ///
    /// `min(level, jobs)`, never below one.
    pub fn workers_for(&self, jobs: usize) -> usize {
        self.0.min(jobs).max(1)
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self(1)
    }
}

/// Immutable configuration for one batch invocation.
///
/// Built once by the entry point and shared (`Arc<BatchConfig>`) by every
/// component. Paths of all files the batch creates are derived here so that
/// the naming scheme lives in one place.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Directory receiving outputs, temporaries and the checkpoint file.
    pub output_dir: PathBuf,

    /// Delete any prior checkpoint before loading (start over).
    pub overwrite: bool,

    /// Delete the source DEM once its result has been recorded.
    pub delete_source: bool,

    /// Consolidate outputs into `merged_<unit>.mbtiles` after the batch.
    pub merge: bool,

    /// Verbose diagnostics.
    pub debug: bool,

    /// Maximum number of jobs in flight.
    pub concurrency: Concurrency,

    /// Tool parameters.
    pub settings: ContourSettings,
}

impl BatchConfig {
    /// Creates a configuration with default options for an output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite: false,
            delete_source: false,
            merge: false,
            debug: false,
            concurrency: Concurrency::default(),
            settings: ContourSettings::default(),
        }
    }

    /// Sets start-over mode.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets delete-source-on-success.
    pub fn with_delete_source(mut self, delete_source: bool) -> Self {
        self.delete_source = delete_source;
        self
    }

    /// Sets merge-after-batch.
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// Sets debug mode.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the concurrency level.
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the tool parameters.
    pub fn with_settings(mut self, settings: ContourSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Path of the checkpoint file.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join(CHECKPOINT_FILE_NAME)
    }

    /// Path of the retained package for a source file and unit system.
    pub fn output_path(&self, source_name: &str, unit: UnitSystem) -> PathBuf {
        self.output_dir.join(unit.output_file_name(source_name))
    }

    /// Path of the consolidated package for a unit system.
    pub fn merged_path(&self, unit: UnitSystem) -> PathBuf {
        self.output_dir.join(unit.merged_file_name())
    }

    /// Path of a job-scoped temporary artifact.
    pub fn temp_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", TEMP_PREFIX, name))
    }

    /// Path of the tile prefilter script for a unit system.
    pub fn prefilter_script_path(&self, unit: UnitSystem) -> PathBuf {
        self.output_dir.join(format!(".{}_prefilter.sh", unit.name()))
    }
}
