//! Pre-flight check for required external tools.
//!
//! Every tool is probed with `--version` before any job starts. A tool that
//! cannot be launched is missing; all missing tools are reported together so
//! the user can install them in one go. A missing tool is the only error
//! that aborts a whole batch.

use futures::future::join_all;
use tracing::{debug, error};

use crate::error::{ContourError, ContourResult};
use crate::gateway::{GatewayError, Tool, ToolCommand, ToolGateway};
use crate::parsers::{parse_version, ToolVersion};

/// Probes every required tool concurrently.
///
/// Returns the detected versions, or [`ContourError::ToolUnavailable`]
/// naming every tool that could not be launched.
pub async fn check_tools(gateway: &dyn ToolGateway) -> ContourResult<Vec<ToolVersion>> {
    let probes = Tool::ALL.iter().map(|&tool| probe(gateway, tool));
    let results = join_all(probes).await;

    let mut versions = Vec::with_capacity(results.len());
    let mut missing = Vec::new();

    for (tool, result) in Tool::ALL.iter().zip(results) {
        match result {
            Some(version) => {
                debug!(tool = %tool, version = %version, "Tool available");
                versions.push(version);
            }
            None => {
                error!(
                    tool = %tool,
                    package = tool.package_hint(),
                    "Required tool is not installed"
                );
                missing.push(tool.program().to_string());
            }
        }
    }

    if missing.is_empty() {
        Ok(versions)
    } else {
        Err(ContourError::ToolUnavailable { tools: missing })
    }
}

/// Probes one tool. Any exit status counts as installed; only a failed
/// launch means missing.
async fn probe(gateway: &dyn ToolGateway, tool: Tool) -> Option<ToolVersion> {
    let command = ToolCommand::new(tool).arg("--version");

    match gateway.execute(&command).await {
        Ok(output) => Some(parse_version(tool, &output.text())),
        Err(GatewayError::Spawn { source, .. }) => {
            debug!(tool = %tool, error = %source, "Probe failed to launch");
            None
        }
        Err(e) => {
            debug!(tool = %tool, error = %e, "Probe did not complete");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CommandOutput;
    use crate::stages::test_support::RecordingGateway;
    use semver::Version;
    use std::io;

    fn installed(missing: &'static [Tool]) -> RecordingGateway {
        RecordingGateway::new(move |cmd| {
            if missing.contains(&cmd.tool) {
                return Err(GatewayError::Spawn {
                    tool: cmd.tool,
                    source: io::Error::new(io::ErrorKind::NotFound, "not found"),
                });
            }
            let text = match cmd.tool {
                Tool::Tippecanoe | Tool::TileJoin => "tippecanoe v2.53.0",
                Tool::Jq => "jq-1.7.1",
                _ => "GDAL 3.8.4, released 2024/02/08",
            };
            Ok(CommandOutput::evaluate(
                cmd.tool,
                Some(0),
                String::new(),
                text.to_string(),
            ))
        })
    }

    #[tokio::test]
    async fn test_all_tools_present() {
        let gateway = installed(&[]);
        let versions = check_tools(&gateway).await.unwrap();

        assert_eq!(versions.len(), Tool::ALL.len());
        assert_eq!(versions[0].version, Some(Version::new(3, 8, 4)));
        assert!(gateway
            .commands
            .lock()
            .iter()
            .all(|c| c.args == vec!["--version"]));
    }

    #[tokio::test]
    async fn test_reports_every_missing_tool() {
        let gateway = installed(&[Tool::Tippecanoe, Tool::TileJoin, Tool::Jq]);
        let err = check_tools(&gateway).await.unwrap_err();

        match &err {
            ContourError::ToolUnavailable { tools } => {
                assert_eq!(tools, &vec!["tippecanoe", "tile-join", "jq"])
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.is_batch_fatal());
    }

    #[tokio::test]
    async fn test_nonzero_exit_counts_as_installed() {
        let gateway = RecordingGateway::new(|cmd| {
            Ok(CommandOutput::evaluate(
                cmd.tool,
                Some(1),
                String::new(),
                "unknown option".to_string(),
            ))
        });
        let versions = check_tools(&gateway).await.unwrap();
        assert!(versions.iter().all(|v| v.version.is_none()));
    }
}
