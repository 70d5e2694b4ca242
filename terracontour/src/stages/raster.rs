//! Raster stages: metadata, VRT build, reprojection and unit conversion.

use std::path::Path;

use tracing::{debug, instrument};

use super::{run_checked, StageKind};
use crate::config::ContourSettings;
use crate::error::{ContourError, ContourResult};
use crate::gateway::{Tool, ToolCommand, ToolGateway};
use crate::parsers::{parse_raster_info, RasterInfo};
use crate::units::METRES_PER_FOOT;

/// Reads raster metadata with `gdalinfo -json`.
#[instrument(skip(gateway), fields(dem = %dem.display()))]
pub async fn read_metadata(gateway: &dyn ToolGateway, dem: &Path) -> ContourResult<RasterInfo> {
    let command = ToolCommand::new(Tool::GdalInfo).arg("-json").path(dem);
    let output = run_checked(gateway, StageKind::Metadata, &command).await?;

    parse_raster_info(&output.stdout).map_err(|e| ContourError::stage(StageKind::Metadata, e))
}

/// Resolves the source EPSG code, failing the job if there is none.
pub fn resolve_epsg(info: &RasterInfo, dem: &Path) -> ContourResult<u32> {
    let epsg = info
        .epsg_code()
        .ok_or_else(|| ContourError::MissingProjection {
            path: dem.to_path_buf(),
        })?;
    debug!(dem = %dem.display(), epsg, "Resolved source projection");
    Ok(epsg)
}

/// Wraps the DEM in a virtual raster.
#[instrument(skip(gateway), fields(dem = %dem.display()))]
pub async fn build_vrt(gateway: &dyn ToolGateway, dem: &Path, vrt: &Path) -> ContourResult<()> {
    let command = ToolCommand::new(Tool::GdalBuildVrt)
        .arg("-q")
        .output_path(vrt)
        .path(dem);
    run_checked(gateway, StageKind::BuildVrt, &command).await?;
    Ok(())
}

/// Reprojects into the target reference system as 16-bit integers.
#[instrument(skip(gateway, settings), fields(source = %source.display()))]
pub async fn reproject(
    gateway: &dyn ToolGateway,
    settings: &ContourSettings,
    source: &Path,
    target: &Path,
    epsg: u32,
) -> ContourResult<()> {
    let command = ToolCommand::new(Tool::GdalWarp)
        .args(["-q", "-r", settings.resampling.as_str()])
        .args(["-s_srs".to_string(), format!("EPSG:{}", epsg)])
        .args(["-t_srs", settings.target_srs.as_str()])
        .args(["-ot", settings.output_type.as_str()])
        .args(["-dstnodata".to_string(), settings.nodata.to_string()])
        .path(source)
        .output_path(target);
    run_checked(gateway, StageKind::Reproject, &command).await?;
    Ok(())
}

/// Rescales metre elevations to feet.
#[instrument(skip(gateway), fields(source = %source.display()))]
pub async fn convert_units(
    gateway: &dyn ToolGateway,
    source: &Path,
    target: &Path,
) -> ContourResult<()> {
    let command = ToolCommand::new(Tool::GdalTranslate)
        .args(["-q", "-scale", "0"])
        .arg(METRES_PER_FOOT.to_string())
        .args(["0", "1"])
        .path(source)
        .output_path(target);
    run_checked(gateway, StageKind::UnitConversion, &command).await?;
    Ok(())
}
