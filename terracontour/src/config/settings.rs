//! Tool parameters for the transformation stages.

use std::time::Duration;

use crate::units::{UnitSystem, DEFAULT_IMPERIAL_INTERVAL, DEFAULT_METRIC_INTERVAL};

/// Default lowest zoom level written to tile packages.
pub const DEFAULT_MIN_ZOOM: u8 = 11;

/// Default highest zoom level written to tile packages.
pub const DEFAULT_MAX_ZOOM: u8 = 13;

/// Default target spatial reference for reprojection.
pub const DEFAULT_TARGET_SRS: &str = "EPSG:3857";

/// Default resampling method for reprojection.
pub const DEFAULT_RESAMPLING: &str = "cubicspline";

/// Parameters passed to the external tools.
///
/// Defaults reproduce the established output: 10 m and 40 ft contours,
/// zoom 11-13, Web Mercator, 16-bit integer elevations.
#[derive(Clone, Debug, PartialEq)]
pub struct ContourSettings {
    /// Unit systems to produce, in processing order.
    pub units: Vec<UnitSystem>,

    /// Contour interval in metres.
    pub metric_interval: u32,

    /// Contour interval in feet.
    pub imperial_interval: u32,

    /// Lowest zoom level of the tile packages.
    pub min_zoom: u8,

    /// Highest zoom level of the tile packages.
    pub max_zoom: u8,

    /// Target spatial reference for `gdalwarp -t_srs`.
    pub target_srs: String,

    /// Resampling method for `gdalwarp -r`.
    pub resampling: String,

    /// Output data type for `gdalwarp -ot`.
    pub output_type: String,

    /// NoData value for `gdalwarp -dstnodata`.
    pub nodata: i32,

    /// Per-invocation timeout for external tools. `None` waits forever.
    pub tool_timeout: Option<Duration>,
}

impl Default for ContourSettings {
    fn default() -> Self {
        Self {
            units: UnitSystem::ALL.to_vec(),
            metric_interval: DEFAULT_METRIC_INTERVAL,
            imperial_interval: DEFAULT_IMPERIAL_INTERVAL,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            target_srs: DEFAULT_TARGET_SRS.to_string(),
            resampling: DEFAULT_RESAMPLING.to_string(),
            output_type: "Int16".to_string(),
            nodata: -32768,
            tool_timeout: None,
        }
    }
}

impl ContourSettings {
    /// Contour interval for a unit system.
    pub fn interval(&self, unit: UnitSystem) -> u32 {
        match unit {
            UnitSystem::Metric => self.metric_interval,
            UnitSystem::Imperial => self.imperial_interval,
        }
    }

    /// Sets the tool timeout. Zero disables it.
    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Validates cross-field constraints.
    pub fn validate(&self) -> Result<(), String> {
        if self.units.is_empty() {
            return Err("at least one unit system is required".to_string());
        }
        if self.metric_interval == 0 || self.imperial_interval == 0 {
            return Err("contour intervals must be positive".to_string());
        }
        if self.min_zoom > self.max_zoom {
            return Err(format!(
                "min_zoom ({}) must not exceed max_zoom ({})",
                self.min_zoom, self.max_zoom
            ));
        }
        Ok(())
    }
}
