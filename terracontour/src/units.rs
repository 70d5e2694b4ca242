//! Unit systems for contour output variants.
//!
//! Every DEM produces one tile package per unit system. The unit system
//! decides the elevation attribute name, the layer name, the vertical scale
//! applied before contouring and the file name suffix of retained outputs.

use std::fmt;
use std::str::FromStr;

/// Metres per foot, used to rescale metric elevations into feet.
pub const METRES_PER_FOOT: f64 = 0.3048;

/// Default contour interval for metric output (metres).
pub const DEFAULT_METRIC_INTERVAL: u32 = 10;

/// Default contour interval for imperial output (feet).
pub const DEFAULT_IMPERIAL_INTERVAL: u32 = 40;

/// A target unit system for contour lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitSystem {
    /// Elevations in metres.
    Metric,
    /// Elevations in feet.
    Imperial,
}

impl UnitSystem {
    /// All unit systems in default processing order.
    pub const ALL: [UnitSystem; 2] = [UnitSystem::Metric, UnitSystem::Imperial];

    /// Name used in file names (`<source>_metric.mbtiles`).
    pub fn name(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Short unit suffix (`m` or `ft`).
    pub fn suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m",
            UnitSystem::Imperial => "ft",
        }
    }

    /// Feature attribute holding the elevation (`ele_m` or `ele_ft`).
    pub fn elevation_attribute(&self) -> String {
        format!("ele_{}", self.suffix())
    }

    /// Vector tile layer name for the given interval (`contour_10m`).
    pub fn layer_name(&self, interval: u32) -> String {
        format!("contour_{}{}", interval, self.suffix())
    }

    /// Whether the reprojected raster must be rescaled before contouring.
    pub fn needs_rescale(&self) -> bool {
        matches!(self, UnitSystem::Imperial)
    }

    /// Coarse and medium elevation steps kept by the zoom prefilter.
    ///
    /// At the lowest zoom only multiples of the coarse step survive, one zoom
    /// level up multiples of the medium step.
    pub fn prefilter_steps(&self) -> (u32, u32) {
        match self {
            UnitSystem::Metric => (50, 20),
            UnitSystem::Imperial => (200, 80),
        }
    }

    /// File name of the retained package for a source file.
    pub fn output_file_name(&self, source_name: &str) -> String {
        format!("{}_{}.mbtiles", source_name, self.name())
    }

    /// File name of the consolidated package produced by the merge stage.
    pub fn merged_file_name(&self) -> String {
        format!("merged_{}.mbtiles", self.name())
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "m" => Ok(UnitSystem::Metric),
            "imperial" | "ft" => Ok(UnitSystem::Imperial),
            other => Err(format!("unknown unit system '{}'", other)),
        }
    }
}
