//! File-backed checkpoint store.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::state::{CheckpointState, ProcessingRecord};
use super::CheckpointError;
use crate::format::format_duration;

/// Serializes and persists the checkpoint of one output directory.
///
/// Created once per batch. `record` holds an async mutex across the whole
/// read-modify-persist cycle, so concurrent jobs can record without losing
/// each other's updates. The file is replaced atomically (temp file plus
/// rename); a crash mid-write leaves the previous checkpoint intact.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    state: Mutex<CheckpointState>,
}

impl CheckpointStore {
    /// Loads the checkpoint at `path`.
    ///
    /// A missing or empty file starts from an empty state. Missing fields
    /// are filled with defaults.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, CheckpointError> {
        let path = path.into();

        let state = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => CheckpointState::default(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| CheckpointError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => CheckpointState::default(),
            Err(source) => {
                return Err(CheckpointError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };

        debug!(path = %path.display(), records = state.len(), "Loaded checkpoint");

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Deletes the checkpoint at `path`, if any.
    pub async fn reset(path: &Path) -> Result<(), CheckpointError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!(path = %path.display(), "Removed previous checkpoint");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CheckpointError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Resets (when starting over) and then loads the checkpoint.
    pub async fn prepare(path: impl Into<PathBuf>, start_over: bool) -> Result<Self, CheckpointError> {
        let path = path.into();
        if start_over {
            Self::reset(&path).await?;
        }
        Self::load(path).await
    }

    /// Path of the checkpoint file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records a finished job and persists the whole state.
    ///
    /// The duration is measured from `started` to now. If the write fails
    /// the record is dropped, so a later record cannot persist it.
    pub async fn record(
        &self,
        source: &str,
        output: Option<&Path>,
        started: DateTime<Local>,
        empty: bool,
    ) -> Result<(), CheckpointError> {
        let now = Local::now();
        let elapsed = (now - started).to_std().unwrap_or_default();

        let record = ProcessingRecord {
            completed: true,
            output_file: output.map(|p| p.to_string_lossy().into_owned()),
            duration: format_duration(elapsed),
            start_time: started.to_rfc3339(),
            timestamp: now.to_rfc3339(),
            empty,
        };

        // The in-memory state only changes once the file holds it too.
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.upsert(source, record);
        self.persist(&next).await?;
        *state = next;

        debug!(source, empty, "Recorded job in checkpoint");
        Ok(())
    }

    /// Returns true if the job finished in an earlier run and its result is
    /// still valid.
    ///
    /// An empty record is always valid. A record with an output is valid only
    /// while that output exists on disk.
    pub async fn is_processed(&self, source: &str) -> bool {
        let output = {
            let state = self.state.lock().await;
            match state.get(source) {
                Some(record) if record.completed && record.empty => return true,
                Some(record) if record.completed => record.output_path(),
                _ => None,
            }
        };

        match output {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Returns a copy of one record.
    pub async fn get(&self, source: &str) -> Option<ProcessingRecord> {
        self.state.lock().await.get(source).cloned()
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> CheckpointState {
        self.state.lock().await.clone()
    }

    async fn persist(&self, state: &CheckpointState) -> Result<(), CheckpointError> {
        let write_err = |source| CheckpointError::Write {
            path: self.path.clone(),
            source,
        };

        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        state
            .serialize(&mut serializer)
            .map_err(|e| write_err(io::Error::other(e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &bytes).await.map_err(write_err)?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(write_err)?;

        Ok(())
    }
}
