//! Typed parsers for external tool output.
//!
//! Each parser turns captured text of one tool into a typed result and is
//! independent of process invocation, so it can be tested against recorded
//! output.
//!
//! - [`gdalinfo`] - raster metadata (`gdalinfo -json`) and EPSG extraction
//! - [`tippecanoe`] - feature count summary: features, empty, or error
//! - [`tile_join`] - merge status
//! - [`version`] - `--version` probes used by the pre-flight check

pub mod gdalinfo;
pub mod tile_join;
pub mod tippecanoe;
pub mod version;

pub use gdalinfo::{extract_epsg, parse_raster_info, CornerCoordinates, RasterInfo};
pub use tile_join::{parse_tile_join, TileJoinOutcome};
pub use tippecanoe::{parse_packaging, PackagingOutcome};
pub use version::{parse_version, ToolVersion};
