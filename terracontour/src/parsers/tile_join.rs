//! Parser for tile-join output.
//!
//! tile-join prints per-tile progress like `13/4301/2868` to stderr while it
//! works. Progress output means the join ran; anything else is an error
//! message.

use std::sync::OnceLock;

use regex::Regex;

use crate::gateway::CommandOutput;

/// Typed result of one tile-join run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileJoinOutcome {
    /// The consolidated package was written.
    Joined,

    /// tile-join failed; carries a failure description.
    Failed(String),
}

fn progress_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*[0-9/]+").unwrap())
}

/// Classifies a tile-join invocation.
pub fn parse_tile_join(output: &CommandOutput) -> TileJoinOutcome {
    let text = output.text();
    let progressed = progress_pattern().is_match(&text);

    if output.success && (progressed || text.trim().is_empty()) {
        TileJoinOutcome::Joined
    } else {
        TileJoinOutcome::Failed(output.failure_summary())
    }
}
