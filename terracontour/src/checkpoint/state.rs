//! Checkpoint data model.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Completion record of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingRecord {
    /// Always true for persisted records; failed jobs are never recorded.
    #[serde(default)]
    pub completed: bool,

    /// Retained output package, `null` for empty results.
    #[serde(default)]
    pub output_file: Option<String>,

    /// Human-readable processing time.
    #[serde(default)]
    pub duration: String,

    /// When processing started (RFC 3339).
    #[serde(default)]
    pub start_time: String,

    /// When the record was written (RFC 3339).
    #[serde(default)]
    pub timestamp: String,

    /// The source produced no contour features.
    #[serde(default)]
    pub empty: bool,
}

impl ProcessingRecord {
    /// The retained output as a path.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_file.as_deref().map(PathBuf::from)
    }
}

/// All records, keyed by source path.
///
/// Keys are kept sorted so rewrites of an unchanged state are byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointState {
    #[serde(default)]
    pub files: BTreeMap<String, ProcessingRecord>,
}

impl CheckpointState {
    /// Looks up the record of a source file.
    pub fn get(&self, source: &str) -> Option<&ProcessingRecord> {
        self.files.get(source)
    }

    /// Inserts or replaces the record of a source file.
    pub fn upsert(&mut self, source: impl Into<String>, record: ProcessingRecord) {
        self.files.insert(source.into(), record);
    }

    /// Number of recorded source files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

}
