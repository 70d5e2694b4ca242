//! Gateway backed by operating system processes.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::debug;

use super::command::{CommandOutput, ToolCommand};
use super::{BoxFuture, GatewayError, ToolGateway};

/// Runs tools as child processes via `tokio::process`.
///
/// Arguments are passed directly to the program, never through a shell.
/// With a timeout configured, an invocation that runs too long is killed and
/// reported as [`GatewayError::Timeout`]; without one it may block its job
/// indefinitely.
#[derive(Debug, Clone, Default)]
pub struct ProcessGateway {
    timeout: Option<Duration>,
}

impl ProcessGateway {
    /// Creates a gateway with an optional per-invocation timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Returns the configured timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn run(&self, command: &ToolCommand) -> Result<CommandOutput, GatewayError> {
        let tool = command.tool;
        let start = Instant::now();

        let child = Command::new(tool.program())
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(GatewayError::Timeout {
                        tool,
                        secs: limit.as_secs(),
                    })
                }
            },
            None => child.await,
        }
        .map_err(|source| GatewayError::Spawn { tool, source })?;

        let result = CommandOutput::evaluate(
            tool,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        );

        debug!(
            tool = %tool,
            success = result.success,
            exit_code = ?result.exit_code,
            duration_ms = start.elapsed().as_millis() as u64,
            "Tool finished"
        );

        Ok(result)
    }
}

impl ToolGateway for ProcessGateway {
    fn execute<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> BoxFuture<'a, Result<CommandOutput, GatewayError>> {
        Box::pin(self.run(command))
    }
}
