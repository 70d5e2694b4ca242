//! Vector tile packaging with tippecanoe.

use std::path::Path;

use tracing::{debug, instrument};

use super::{remove_file_if_exists, run_tool, StageKind};
use crate::config::ContourSettings;
use crate::error::{ContourError, ContourResult};
use crate::gateway::{Tool, ToolCommand, ToolGateway};
use crate::parsers::{parse_packaging, PackagingOutcome};
use crate::units::UnitSystem;

/// Packages contour lines into an mbtiles file.
///
/// Returns the feature count, or `None` when the input held no features.
/// An empty package is deleted before returning; it is not an error. A
/// partial package left by a failed run is deleted as well.
#[instrument(skip(gateway, settings, prefilter), fields(unit = %unit))]
pub async fn package_tiles(
    gateway: &dyn ToolGateway,
    settings: &ContourSettings,
    unit: UnitSystem,
    prefilter: &Path,
    geojson: &Path,
    output: &Path,
) -> ContourResult<Option<u64>> {
    let command = ToolCommand::new(Tool::Tippecanoe)
        .arg(format!("-Z{}", settings.min_zoom))
        .arg(format!("-z{}", settings.max_zoom))
        .args(["-P", "-b", "0", "--force"])
        .args(["-y".to_string(), unit.elevation_attribute()])
        .args([
            "-l".to_string(),
            unit.layer_name(settings.interval(unit)),
        ])
        .args([
            "-C".to_string(),
            format!("{} \"$@\"", shell_quote(&prefilter.to_string_lossy())),
        ])
        .arg("-o")
        .output_path(output)
        .path(geojson);

    let result = run_tool(gateway, StageKind::TilePackaging, &command).await?;

    match parse_packaging(&result) {
        PackagingOutcome::Features(n) => {
            debug!(features = n, output = %output.display(), "Packaged contour tiles");
            Ok(Some(n))
        }
        PackagingOutcome::Empty => {
            debug!(output = %output.display(), "No contour features, discarding package");
            remove_file_if_exists(output).await?;
            Ok(None)
        }
        PackagingOutcome::Error(message) => {
            remove_file_if_exists(output).await?;
            Err(ContourError::stage(StageKind::TilePackaging, message))
        }
    }
}

/// Single-quotes a word for `sh -c`, which tippecanoe runs filters with.
fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}
