//! Parser for the tippecanoe feature summary.
//!
//! tippecanoe reports progress and a summary line on stderr whether it
//! succeeds or not, for example:
//!
//! ```text
//! For layer 0, using name "contour_10m"
//! 48213 features, 2207419 bytes of geometry, 4 bytes of separate metadata
//! ```
//!
//! The feature count decides the outcome. Zero features means the DEM was
//! flat (sea, lakes) and is a valid empty result, not a failure.

use std::sync::OnceLock;

use regex::Regex;

use crate::gateway::CommandOutput;

/// Typed result of one tile packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagingOutcome {
    /// A package with this many features was written.
    Features(u64),

    /// No features; the partial package must be discarded.
    Empty,

    /// tippecanoe failed; carries a failure description.
    Error(String),
}

impl PackagingOutcome {
    /// Returns true if a package with features was produced.
    pub fn has_features(&self) -> bool {
        matches!(self, PackagingOutcome::Features(_))
    }
}

fn feature_count_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)\s+features,").unwrap())
}

/// Message printed when the input holds no geometry at all.
const NO_GEOMETRIES: &str = "Did not read any valid geometries";

/// Reads the feature count from tippecanoe output.
///
/// The last summary line wins. Returns `None` if there is none.
pub fn feature_count(text: &str) -> Option<u64> {
    feature_count_pattern()
        .captures_iter(text)
        .last()
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Classifies a tippecanoe invocation.
///
/// The summary is authoritative: tippecanoe may exit non-zero on empty
/// input, so an explicit zero count is `Empty` regardless of exit status.
/// Without a summary the run is an `Error`.
pub fn parse_packaging(output: &CommandOutput) -> PackagingOutcome {
    let text = output.text();

    match feature_count(&text) {
        Some(0) => PackagingOutcome::Empty,
        Some(n) if output.success => PackagingOutcome::Features(n),
        Some(_) => PackagingOutcome::Error(output.failure_summary()),
        None if text.contains(NO_GEOMETRIES) => PackagingOutcome::Empty,
        None => PackagingOutcome::Error(output.failure_summary()),
    }
}
