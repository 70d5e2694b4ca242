//! CLI error type.

use std::fmt;

use terracontour::config::ConfigError;
use terracontour::logging::LoggingError;
use terracontour::ContourError;

/// Errors that end the CLI with a non-zero exit code.
#[derive(Debug)]
pub enum CliError {
    /// The config file could not be loaded.
    Config(ConfigError),
    /// Logging could not be set up.
    Logging(LoggingError),
    /// The batch could not start.
    Batch(ContourError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Batch(ContourError::ToolUnavailable { tools }) => write!(
                f,
                "required tools are not installed: {}\n\
                 Install GDAL (gdal-bin), tippecanoe and jq, then run `terracontour tools`.",
                tools.join(", ")
            ),
            CliError::Batch(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<ContourError> for CliError {
    fn from(e: ContourError) -> Self {
        CliError::Batch(e)
    }
}
