//! Configuration for contour batches.
//!
//! Configuration is an explicit, immutable value built once per batch and
//! shared read-only by the scheduler, the pipeline runners and the merge
//! stage. Nothing in the library reads global mutable state.
//!
//! # Layers
//!
//! ```text
//! config.ini (optional) ──► ConfigFile ──┐
//!                                        ├──► BatchConfig (Arc, read-only)
//! CLI flags ─────────────────────────────┘
//! ```
//!
//! - [`ContourSettings`] - tool parameters (intervals, zoom range, projection)
//! - [`ConfigFile`] - INI file overrides for the settings
//! - [`BatchConfig`] - one batch invocation: output directory, options, settings
//! - [`Concurrency`] - coerced worker count

mod batch;
mod file;
mod settings;

pub use batch::{BatchConfig, Concurrency, CHECKPOINT_FILE_NAME};
pub use file::{ConfigError, ConfigFile};
pub use settings::ContourSettings;
