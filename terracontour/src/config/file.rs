//! INI configuration file support.
//!
//! The file is optional. When present it overrides the built-in
//! [`ContourSettings`] defaults; command line flags override the file.
//!
//! ```ini
//! [batch]
//! threads = 4
//!
//! [contour]
//! units = metric, imperial
//! metric_interval = 10
//! imperial_interval = 40
//!
//! [tiles]
//! min_zoom = 11
//! max_zoom = 13
//!
//! [reproject]
//! target_srs = EPSG:3857
//! resampling = cubicspline
//!
//! [tools]
//! timeout_secs = 0
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::settings::ContourSettings;
use crate::units::UnitSystem;

/// Directory name under the home directory holding the config file.
const CONFIG_DIR_NAME: &str = ".terracontour";

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors that can occur while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed.
    #[error("failed to read config file {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    /// A key holds a value of the wrong shape.
    #[error("invalid value '{value}' for [{section}] {key}")]
    Invalid {
        section: String,
        key: String,
        value: String,
    },

    /// The resulting settings are inconsistent.
    #[error("invalid settings: {0}")]
    Settings(String),
}

/// Values loaded from `config.ini`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    /// `[batch] threads`, uncoerced.
    pub threads: Option<i64>,

    /// Settings with file overrides applied.
    pub settings: ContourSettings,
}

impl ConfigFile {
    /// Default location: `~/.terracontour/config.ini`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the file from the default location.
    ///
    /// A missing file (or missing home directory) yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads the file from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    /// Parses configuration from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut settings = ContourSettings::default();

        let threads = parse_key::<i64>(ini, "batch", "threads")?;

        if let Some(units) = get(ini, "contour", "units") {
            settings.units = units
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.parse::<UnitSystem>()
                        .map_err(|_| invalid("contour", "units", units))
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = parse_key(ini, "contour", "metric_interval")? {
            settings.metric_interval = v;
        }
        if let Some(v) = parse_key(ini, "contour", "imperial_interval")? {
            settings.imperial_interval = v;
        }
        if let Some(v) = parse_key(ini, "tiles", "min_zoom")? {
            settings.min_zoom = v;
        }
        if let Some(v) = parse_key(ini, "tiles", "max_zoom")? {
            settings.max_zoom = v;
        }
        if let Some(v) = get(ini, "reproject", "target_srs") {
            settings.target_srs = v.to_string();
        }
        if let Some(v) = get(ini, "reproject", "resampling") {
            settings.resampling = v.to_string();
        }
        if let Some(secs) = parse_key::<u64>(ini, "tools", "timeout_secs")? {
            settings = settings.with_tool_timeout(Some(Duration::from_secs(secs)));
        }

        settings.validate().map_err(ConfigError::Settings)?;

        Ok(Self { threads, settings })
    }
}

fn get<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section))
        .and_then(|s| s.get(key))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_key<T: FromStr>(ini: &Ini, section: &str, key: &str) -> Result<Option<T>, ConfigError> {
    match get(ini, section, key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, raw)),
        None => Ok(None),
    }
}

fn invalid(section: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}
