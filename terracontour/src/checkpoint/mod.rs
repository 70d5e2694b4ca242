//! Durable per-job completion records.
//!
//! The checkpoint is a single JSON file in the output directory. It maps
//! each source path to a [`ProcessingRecord`] and is rewritten whole on
//! every update:
//!
//! ```json
//! {
//!    "files": {
//!       "/dem/N47E011.hgt": {
//!          "completed": true,
//!          "outputFile": "/out/N47E011.hgt_metric.mbtiles",
//!          "duration": "1 minutes, 12 seconds, 480 ms",
//!          "startTime": "2024-05-01T10:00:00+02:00",
//!          "timestamp": "2024-05-01T10:01:12+02:00",
//!          "empty": false
//!       }
//!    }
//! }
//! ```
//!
//! A job counts as processed only while its recorded output still exists
//! (or it was recorded empty), so deleting an output re-queues its job on
//! the next run.

mod state;
mod store;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use state::{CheckpointState, ProcessingRecord};
pub use store::CheckpointStore;

/// Errors that can occur while reading or persisting the checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The checkpoint file exists but could not be read or removed.
    #[error("failed to read checkpoint {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The checkpoint file could not be written.
    #[error("failed to write checkpoint {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The checkpoint file holds invalid JSON.
    #[error("invalid checkpoint {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
