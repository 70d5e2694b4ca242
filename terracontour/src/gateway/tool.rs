//! Catalogue of external tools and their output contracts.

use std::fmt;

/// How a tool signals success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StderrPolicy {
    /// Exit status 0, and stderr output without any stdout is a failure.
    ///
    /// GDAL utilities run with `-q` print nothing on success and only errors
    /// to stderr, so stderr-only output means the step went wrong.
    Strict,

    /// Exit status 0; stderr is diagnostic.
    ///
    /// tippecanoe and tile-join always write progress and summaries to
    /// stderr. Their stage parsers inspect the text and decide the outcome,
    /// also for non-zero exits (tippecanoe exits non-zero on empty input).
    Diagnostic,

    /// Exit status alone decides.
    ExitStatus,
}

/// An external command line tool used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Raster metadata as JSON.
    GdalInfo,
    /// Virtual raster builder.
    GdalBuildVrt,
    /// Reprojection and type conversion.
    GdalWarp,
    /// Vertical unit rescaling.
    GdalTranslate,
    /// Contour line extraction.
    GdalContour,
    /// Vector tile packaging.
    Tippecanoe,
    /// Tile package merging.
    TileJoin,
    /// JSON filter used by the tile prefilter scripts.
    Jq,
}

impl Tool {
    /// Every tool the batch needs, in pre-flight order.
    pub const ALL: [Tool; 8] = [
        Tool::GdalInfo,
        Tool::GdalBuildVrt,
        Tool::GdalWarp,
        Tool::GdalTranslate,
        Tool::GdalContour,
        Tool::Tippecanoe,
        Tool::TileJoin,
        Tool::Jq,
    ];

    /// Executable name looked up on `PATH`.
    pub fn program(&self) -> &'static str {
        match self {
            Tool::GdalInfo => "gdalinfo",
            Tool::GdalBuildVrt => "gdalbuildvrt",
            Tool::GdalWarp => "gdalwarp",
            Tool::GdalTranslate => "gdal_translate",
            Tool::GdalContour => "gdal_contour",
            Tool::Tippecanoe => "tippecanoe",
            Tool::TileJoin => "tile-join",
            Tool::Jq => "jq",
        }
    }

    /// The tool's success contract.
    pub fn stderr_policy(&self) -> StderrPolicy {
        match self {
            Tool::GdalInfo
            | Tool::GdalBuildVrt
            | Tool::GdalWarp
            | Tool::GdalTranslate
            | Tool::GdalContour => StderrPolicy::Strict,
            Tool::Tippecanoe | Tool::TileJoin => StderrPolicy::Diagnostic,
            Tool::Jq => StderrPolicy::ExitStatus,
        }
    }

    /// Returns true for tools shipped with GDAL.
    pub fn is_gdal(&self) -> bool {
        self.stderr_policy() == StderrPolicy::Strict
    }

    /// Distribution to install when the tool is missing.
    pub fn package_hint(&self) -> &'static str {
        match self {
            Tool::Tippecanoe | Tool::TileJoin => "tippecanoe",
            Tool::Jq => "jq",
            _ => "gdal-bin",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies() {
        assert_eq!(Tool::GdalWarp.stderr_policy(), StderrPolicy::Strict);
        assert_eq!(Tool::Tippecanoe.stderr_policy(), StderrPolicy::Diagnostic);
        assert_eq!(Tool::TileJoin.stderr_policy(), StderrPolicy::Diagnostic);
        assert_eq!(Tool::Jq.stderr_policy(), StderrPolicy::ExitStatus);
    }

    #[test]
    fn test_gdal_tools() {
        let gdal: Vec<_> = Tool::ALL.iter().filter(|t| t.is_gdal()).collect();
        assert_eq!(gdal.len(), 5);
        assert!(gdal.iter().all(|t| t.package_hint() == "gdal-bin"));
    }

    #[test]
    fn test_display_is_program_name() {
        assert_eq!(Tool::TileJoin.to_string(), "tile-join");
        assert_eq!(Tool::GdalTranslate.to_string(), "gdal_translate");
    }
}
