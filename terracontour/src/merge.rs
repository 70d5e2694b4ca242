//! Consolidation of per-file packages with tile-join.
//!
//! After a batch drained, all `<name>_<unit>.mbtiles` packages of one unit
//! system are joined into `merged_<unit>.mbtiles`. A stale consolidated
//! package is replaced, and the SQLite journal tile-join leaves next to its
//! output is removed whether or not the join succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::error::{ContourError, ContourResult};
use crate::gateway::{Tool, ToolCommand, ToolGateway};
use crate::parsers::{parse_tile_join, TileJoinOutcome};
use crate::stages::{remove_file_if_exists, StageKind};
use crate::units::UnitSystem;

/// Prefix of consolidated packages, excluded from merge inputs.
const MERGED_PREFIX: &str = "merged_";

/// Suffix SQLite appends to its rollback journal.
const JOURNAL_SUFFIX: &str = "-journal";

/// Joins per-file packages into one package per unit system.
pub struct MergeStage {
    config: Arc<BatchConfig>,
    gateway: Arc<dyn ToolGateway>,
}

impl MergeStage {
    pub fn new(config: Arc<BatchConfig>, gateway: Arc<dyn ToolGateway>) -> Self {
        Self { config, gateway }
    }

    /// Merges every configured unit system.
    ///
    /// Failures are logged and do not affect the other unit systems.
    /// Returns the consolidated packages that were written.
    pub async fn run(&self) -> Vec<PathBuf> {
        let mut merged = Vec::new();

        for &unit in &self.config.settings.units {
            match self.merge_unit(unit).await {
                Ok(Some(path)) => {
                    info!(unit = %unit, output = %path.display(), "Merged tile packages");
                    merged.push(path);
                }
                Ok(None) => debug!(unit = %unit, "No packages to merge"),
                Err(e) => warn!(unit = %unit, error = %e, "Merge failed"),
            }
        }

        merged
    }

    /// Merges the packages of one unit system.
    ///
    /// Returns `None` when there is nothing to merge.
    pub async fn merge_unit(&self, unit: UnitSystem) -> ContourResult<Option<PathBuf>> {
        let inputs = self.inputs(unit)?;
        if inputs.is_empty() {
            return Ok(None);
        }

        let output = self.config.merged_path(unit);
        let journal = journal_path(&output);
        remove_file_if_exists(&journal).await?;

        let command = ToolCommand::new(Tool::TileJoin)
            .arg("-o")
            .output_path(&output)
            .args(inputs.iter().map(|p| p.to_string_lossy().into_owned()));

        debug!(unit = %unit, inputs = inputs.len(), "Joining tile packages");
        let joined = crate::stages::run_tool(self.gateway.as_ref(), StageKind::Merge, &command).await;

        if let Err(e) = remove_file_if_exists(&journal).await {
            warn!(path = %journal.display(), error = %e, "Failed to remove merge journal");
        }

        match parse_tile_join(&joined?) {
            TileJoinOutcome::Joined => Ok(Some(output)),
            TileJoinOutcome::Failed(message) => Err(ContourError::stage(StageKind::Merge, message)),
        }
    }

    /// Per-file packages of a unit system, sorted by path.
    fn inputs(&self, unit: UnitSystem) -> ContourResult<Vec<PathBuf>> {
        let dir = self.config.output_dir.to_string_lossy();
        let pattern = format!(
            "{}/*_{}.mbtiles",
            glob::Pattern::escape(&dir),
            unit.name()
        );

        let entries = glob::glob(&pattern)
            .map_err(|e| ContourError::stage(StageKind::Merge, e.to_string()))?;

        let mut inputs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|p| {
                p.file_name()
                    .map(|n| !n.to_string_lossy().starts_with(MERGED_PREFIX))
                    .unwrap_or(false)
            })
            .collect();
        inputs.sort();
        Ok(inputs)
    }
}

fn journal_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(JOURNAL_SUFFIX);
    PathBuf::from(name)
}
