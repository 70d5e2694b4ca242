//! Error types for contour batch processing.
//!
//! Errors fall into two propagation classes:
//!
//! - **Batch-fatal**: a required external tool is missing, or the output
//!   directory cannot be prepared. These abort the batch before any job starts.
//! - **Job-scoped**: everything raised while processing a single DEM file.
//!   The pipeline runner turns these into a `Failed` outcome, so sibling jobs
//!   keep running and no checkpoint record is written for the failed job.
//!
//! A zero-feature packaging result is not an error at all; it is modelled as
//! [`crate::pipeline::JobOutcome::Empty`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::gateway::GatewayError;
use crate::stages::StageKind;

/// Result type for contour operations.
pub type ContourResult<T> = Result<T, ContourError>;

/// Errors that can occur while running a contour batch.
#[derive(Debug, Error)]
pub enum ContourError {
    /// One or more required external tools are not installed.
    #[error("required tools are not installed: {}", .tools.join(", "))]
    ToolUnavailable { tools: Vec<String> },

    /// An external tool invocation within a stage failed.
    #[error("{stage} stage failed: {message}")]
    StageExecution { stage: StageKind, message: String },

    /// The metadata stage could not resolve an EPSG identifier.
    #[error("no EPSG identifier found in coordinate system of {}", .path.display())]
    MissingProjection { path: PathBuf },

    /// Another source in the same batch has the same file name, so both
    /// would write the same temporary files and packages.
    #[error("output name {name} is already used by {first} in this batch")]
    NameCollision { name: String, first: String },

    /// Reading or persisting the checkpoint failed.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// The gateway could not run a tool at all.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// File system operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ContourError {
    /// Creates a stage execution error.
    pub fn stage(stage: StageKind, message: impl Into<String>) -> Self {
        Self::StageExecution {
            stage,
            message: message.into(),
        }
    }

    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error aborts the whole batch.
    ///
    /// Only pre-flight failures are fatal. Everything else is isolated to
    /// the job that raised it.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::ToolUnavailable { .. })
    }
}
