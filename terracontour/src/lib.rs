//! Terracontour - batch conversion of elevation rasters into contour tiles
//!
//! This library turns DEM files into vector contour tile packages (mbtiles)
//! by driving GDAL and tippecanoe. It owns the orchestration: a bounded
//! worker pool, a per-file pipeline with skip/empty/failure semantics, a
//! durable checkpoint for resumable runs and an optional merge pass.
//!
//! ```text
//! ContourBatch
//!   ├─► preflight (tool probes)
//!   ├─► CheckpointStore (load / reset)
//!   └─► BatchScheduler ──► PipelineRunner ×N ──► stages ──► ToolGateway
//!              │                   └──► CheckpointStore::record
//!              └─► MergeStage (after all workers finished)
//! ```

pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod logging;
pub mod merge;
pub mod parsers;
pub mod pipeline;
pub mod preflight;
pub mod scheduler;
pub mod stages;
pub mod units;

pub use batch::ContourBatch;
pub use checkpoint::{CheckpointError, CheckpointState, CheckpointStore, ProcessingRecord};
pub use config::{BatchConfig, Concurrency, ConfigFile, ContourSettings};
pub use error::{ContourError, ContourResult};
pub use gateway::{ProcessGateway, Tool, ToolGateway};
pub use pipeline::{Job, JobId, JobOutcome, JobReport, PipelineRunner};
pub use scheduler::{BatchResult, BatchScheduler, JobProcessor, ProgressUpdate};
pub use units::UnitSystem;
