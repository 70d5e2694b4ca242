//! Per-file processing pipeline.
//!
//! A [`PipelineRunner`] takes one [`Job`] (a DEM file) through the stages
//! and reports a terminal [`JobOutcome`]:
//!
//! ```text
//! PENDING ──(already processed)──────────────────────────► SKIPPED
//!    │
//!    └──► RUNNING ─► metadata ─► vrt ─► reproject ─► contours ─► packaging ─┬─► COMPLETED
//!                       │          │        │            │            │       └─► EMPTY
//!                       └──────────┴────────┴────────────┴────────────┴─────────► FAILED
//! ```
//!
//! Every intermediate artifact is tracked in a [`PipelineContext`] and
//! deleted before the job reports, whatever the outcome. Only COMPLETED and
//! EMPTY jobs are written to the checkpoint; a FAILED job stays unrecorded so
//! the next run retries it.

mod context;
mod job;
mod outcome;
mod runner;

pub use context::PipelineContext;
pub use job::{Job, JobId};
pub use outcome::{JobOutcome, JobReport};
pub use runner::PipelineRunner;
