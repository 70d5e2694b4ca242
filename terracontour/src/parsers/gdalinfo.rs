//! Parser for `gdalinfo -json` output.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// Corner coordinates of a raster in its native reference system.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerCoordinates {
    pub upper_left: [f64; 2],
    pub lower_left: [f64; 2],
    pub lower_right: [f64; 2],
    pub upper_right: [f64; 2],
    pub center: [f64; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct CoordinateSystem {
    #[serde(default)]
    wkt: String,
}

/// Raster metadata needed by the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterInfo {
    /// Four corners plus center.
    pub corner_coordinates: CornerCoordinates,

    #[serde(default)]
    coordinate_system: Option<CoordinateSystem>,

    /// Raster dimensions as `[width, height]`.
    #[serde(default)]
    pub size: Vec<u64>,
}

impl RasterInfo {
    /// The coordinate reference system as WKT, empty if absent.
    pub fn wkt(&self) -> &str {
        self.coordinate_system
            .as_ref()
            .map(|cs| cs.wkt.as_str())
            .unwrap_or("")
    }

    /// Numeric EPSG code of the raster's reference system.
    pub fn epsg_code(&self) -> Option<u32> {
        extract_epsg(self.wkt())
    }

    /// Width in pixels.
    pub fn width(&self) -> Option<u64> {
        self.size.first().copied()
    }

    /// Height in pixels.
    pub fn height(&self) -> Option<u64> {
        self.size.get(1).copied()
    }
}

/// Parses `gdalinfo -json` output.
pub fn parse_raster_info(json: &str) -> Result<RasterInfo, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid gdalinfo JSON: {}", e))
}

fn wkt2_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"ID\[\s*"EPSG"\s*,\s*(\d+)\s*\]"#).unwrap())
}

fn wkt1_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"AUTHORITY\[\s*"EPSG"\s*,\s*"(\d+)"\s*\]"#).unwrap())
}

/// Extracts the EPSG code from a WKT coordinate system description.
///
/// The identifier of the CRS itself is the last one in the text; nested
/// datum and axis identifiers come first. WKT2 `ID["EPSG",N]` is preferred,
/// WKT1 `AUTHORITY["EPSG","N"]` is the fallback.
pub fn extract_epsg(wkt: &str) -> Option<u32> {
    let last = |pattern: &Regex| {
        pattern
            .captures_iter(wkt)
            .last()
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    };

    last(wkt2_pattern()).or_else(|| last(wkt1_pattern()))
}
