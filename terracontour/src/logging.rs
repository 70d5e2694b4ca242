//! Tracing subscriber setup.
//!
//! Console output always goes to stderr so it does not interfere with
//! progress bars on stdout. An optional log directory adds a plain-text
//! file layer written through a non-blocking appender; the returned guard
//! must be kept alive until the program exits or buffered lines are lost.
//!
//! `RUST_LOG` takes precedence over the level derived from the debug flag.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "terracontour.log";

/// Errors that can occur while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Logging options.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Emit stage commands, tool output and state transitions.
    pub debug: bool,

    /// Directory for `terracontour.log`; console only when unset.
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            log_dir: None,
        }
    }

    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    /// Default filter directive when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> &'static str {
        if self.debug {
            "terracontour=debug,info"
        } else {
            "info"
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Installs the global subscriber.
///
/// Returns the file appender guard when a log directory is configured.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(LocalTime::new(Rfc3339))
        .with_target(false)
        .with_filter(config.filter());

    let (file, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::new(Rfc3339))
                .with_filter(config.filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(LogConfig::new(false).default_directive(), "info");
        assert_eq!(
            LogConfig::new(true).default_directive(),
            "terracontour=debug,info"
        );
    }

    #[test]
    fn test_log_dir_builder() {
        let config = LogConfig::new(false).with_log_dir(Some(PathBuf::from("/var/log/tc")));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/tc")));
    }
}
