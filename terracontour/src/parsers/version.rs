//! Parser for `--version` probe output.
//!
//! Version strings differ per tool:
//!
//! ```text
//! GDAL 3.6.2, released 2023/01/02
//! tippecanoe v2.53.0
//! jq-1.6
//! ```
//!
//! The first dotted number is normalised to `major.minor.patch` and parsed
//! with `semver`. Two-component versions get a zero patch.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

use crate::gateway::Tool;

/// A detected tool version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    /// The probed tool.
    pub tool: Tool,

    /// Parsed version, if the output contained one.
    pub version: Option<Version>,

    /// First non-empty output line, for display.
    pub raw: String,
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} {}", self.tool, v),
            None => write!(f, "{} ({})", self.tool, self.raw),
        }
    }
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").unwrap())
}

/// Parses probe output of a tool.
pub fn parse_version(tool: Tool, text: &str) -> ToolVersion {
    let raw = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string();

    let version = version_pattern().captures(&raw).and_then(|c| {
        let patch = c.get(3).map(|m| m.as_str()).unwrap_or("0");
        Version::parse(&format!("{}.{}.{}", &c[1], &c[2], patch)).ok()
    });

    ToolVersion { tool, version, raw }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gdal_version() {
        let v = parse_version(Tool::GdalInfo, "GDAL 3.6.2, released 2023/01/02\n");
        assert_eq!(v.version, Some(Version::new(3, 6, 2)));
        assert_eq!(v.raw, "GDAL 3.6.2, released 2023/01/02");
        assert_eq!(v.to_string(), "gdalinfo 3.6.2");
    }

    #[test]
    fn test_tippecanoe_version() {
        let v = parse_version(Tool::Tippecanoe, "tippecanoe v2.53.0\n");
        assert_eq!(v.version, Some(Version::new(2, 53, 0)));
    }

    #[test]
    fn test_two_component_version() {
        let v = parse_version(Tool::Jq, "jq-1.6\n");
        assert_eq!(v.version, Some(Version::new(1, 6, 0)));
    }

    #[test]
    fn test_unversioned_output() {
        let v = parse_version(Tool::TileJoin, "\n  usage: tile-join [options]\n");
        assert_eq!(v.version, None);
        assert_eq!(v.to_string(), "tile-join (usage: tile-join [options])");
    }
}
