//! External Tool Gateway.
//!
//! Every transformation stage runs one external command line through a
//! [`ToolGateway`]. The gateway only launches processes and captures their
//! output; it never interprets tool-specific text. Interpretation lives in
//! [`crate::parsers`], one parser per tool contract.
//!
//! # Success contract
//!
//! Tools disagree on how they signal success, so the contract is declared
//! per tool in [`Tool::stderr_policy`] instead of being guessed at each call
//! site:
//!
//! | Policy | Tools | `CommandOutput::success` |
//! |---|---|---|
//! | `Strict` | GDAL utilities | exit status 0 and no stderr-only output |
//! | `Diagnostic` | tippecanoe, tile-join | exit status 0; stderr holds progress and summaries, the stage parser decides |
//! | `ExitStatus` | jq | exit status 0 |
//!
//! # Example
//!
//! ```ignore
//! use terracontour::gateway::{ProcessGateway, Tool, ToolCommand, ToolGateway};
//!
//! let gateway = ProcessGateway::new(None);
//! let command = ToolCommand::new(Tool::GdalInfo).arg("-json").path(&dem);
//! let output = gateway.execute(&command).await?;
//! ```

mod command;
mod process;
mod tool;

use std::future::Future;
use std::io;
use std::pin::Pin;

use thiserror::Error;

pub use command::{CommandOutput, ToolCommand};
pub use process::ProcessGateway;
pub use tool::{StderrPolicy, Tool};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors raised when a tool could not be run to completion.
///
/// A tool that ran and reported a failure is not a `GatewayError`; that is a
/// `CommandOutput` with `success == false`.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The process could not be started (usually: not installed).
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: Tool,
        #[source]
        source: io::Error,
    },

    /// The invocation exceeded the configured timeout and was killed.
    #[error("{tool} did not finish within {secs}s")]
    Timeout { tool: Tool, secs: u64 },
}

/// Executes external command lines.
///
/// Implementations must be `Send + Sync`; one gateway is shared by all
/// concurrently running jobs.
pub trait ToolGateway: Send + Sync + 'static {
    /// Runs one command line and captures its output.
    fn execute<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> BoxFuture<'a, Result<CommandOutput, GatewayError>>;
}
