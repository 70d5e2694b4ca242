//! Transformation stages.
//!
//! Each stage builds one command line, runs it through the
//! [`ToolGateway`] and checks the result against the tool's contract.
//! Stages consume the previous stage's artifact and write exactly one new
//! artifact; they never decide job outcomes. That is the pipeline runner's
//! job.
//!
//! ```text
//! DEM ─► metadata ─► build VRT ─► reproject ─┬─► contour (metric) ───────────────► package
//!                                            └─► unit conversion ─► contour (ft) ─► package
//! ```
//!
//! Any file already present at a stage's output path is removed before the
//! tool runs, so a crashed earlier run cannot leak stale data into this one.

pub mod contour;
pub mod package;
pub mod prefilter;
pub mod raster;

use std::fmt;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{ContourError, ContourResult};
use crate::gateway::{CommandOutput, Tool, ToolCommand, ToolGateway};

pub use contour::extract_contours;
pub use package::package_tiles;
pub use prefilter::{prefilter_script, remove_prefilter_scripts, write_prefilter_scripts};
pub use raster::{build_vrt, convert_units, read_metadata, reproject, resolve_epsg};

/// Identifies a transformation stage in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Metadata,
    BuildVrt,
    Reproject,
    UnitConversion,
    ContourExtraction,
    TilePackaging,
    Merge,
}

impl StageKind {
    /// The tool that implements this stage.
    pub fn tool(&self) -> Tool {
        match self {
            StageKind::Metadata => Tool::GdalInfo,
            StageKind::BuildVrt => Tool::GdalBuildVrt,
            StageKind::Reproject => Tool::GdalWarp,
            StageKind::UnitConversion => Tool::GdalTranslate,
            StageKind::ContourExtraction => Tool::GdalContour,
            StageKind::TilePackaging => Tool::Tippecanoe,
            StageKind::Merge => Tool::TileJoin,
        }
    }

    /// Human-readable stage name.
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Metadata => "metadata",
            StageKind::BuildVrt => "build vrt",
            StageKind::Reproject => "reproject",
            StageKind::UnitConversion => "unit conversion",
            StageKind::ContourExtraction => "contour extraction",
            StageKind::TilePackaging => "tile packaging",
            StageKind::Merge => "merge",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs a stage command and returns its output whatever the tool reported.
///
/// Launch failures and timeouts become [`ContourError::StageExecution`].
/// Used directly by stages whose parser interprets the output.
pub(crate) async fn run_tool(
    gateway: &dyn ToolGateway,
    stage: StageKind,
    command: &ToolCommand,
) -> ContourResult<CommandOutput> {
    if let Some(output) = &command.output {
        remove_file_if_exists(output).await?;
    }

    debug!(stage = %stage, command = %command, "Running stage command");

    let output = gateway
        .execute(command)
        .await
        .map_err(|e| ContourError::stage(stage, e.to_string()))?;

    debug!(
        stage = %stage,
        success = output.success,
        stdout = %output.stdout.trim(),
        stderr = %output.stderr.trim(),
        "Stage command finished"
    );

    Ok(output)
}

/// Runs a stage command and fails unless the tool reported success.
pub(crate) async fn run_checked(
    gateway: &dyn ToolGateway,
    stage: StageKind,
    command: &ToolCommand,
) -> ContourResult<CommandOutput> {
    let output = run_tool(gateway, stage, command).await?;
    if output.success {
        Ok(output)
    } else {
        Err(ContourError::stage(stage, output.failure_summary()))
    }
}

/// Removes a file, treating a missing file as success.
pub async fn remove_file_if_exists(path: &Path) -> ContourResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ContourError::io(path, e)),
    }
}
