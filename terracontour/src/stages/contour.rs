//! Contour line extraction with `gdal_contour`.

use std::path::Path;

use tracing::instrument;

use super::{run_checked, StageKind};
use crate::config::ContourSettings;
use crate::error::ContourResult;
use crate::gateway::{Tool, ToolCommand, ToolGateway};
use crate::units::UnitSystem;

/// Extracts contour lines as newline-delimited GeoJSON.
///
/// The raster must already be in the unit system's vertical unit. GeoJSONSeq
/// lets tippecanoe read the result in parallel (`-P`).
#[instrument(skip(gateway, settings), fields(unit = %unit))]
pub async fn extract_contours(
    gateway: &dyn ToolGateway,
    settings: &ContourSettings,
    unit: UnitSystem,
    raster: &Path,
    geojson: &Path,
) -> ContourResult<()> {
    let command = ToolCommand::new(Tool::GdalContour)
        .args(["-a".to_string(), unit.elevation_attribute()])
        .args(["-i".to_string(), settings.interval(unit).to_string()])
        .args(["-f", "GeoJSONSeq"])
        .path(raster)
        .output_path(geojson);
    run_checked(gateway, StageKind::ContourExtraction, &command).await?;
    Ok(())
}
