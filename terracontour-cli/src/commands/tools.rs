//! Tools command - reports the installed external tools.

use console::style;
use terracontour::preflight;
use terracontour::{ContourError, ProcessGateway, Tool};

use crate::error::CliError;

/// Run the tools command.
pub async fn run() -> Result<(), CliError> {
    let gateway = ProcessGateway::new(None);

    println!("Required tools");
    println!("==============");
    println!();

    match preflight::check_tools(&gateway).await {
        Ok(versions) => {
            for version in &versions {
                println!("  {} {}", style("✓").green(), version);
            }
            Ok(())
        }
        Err(ContourError::ToolUnavailable { tools }) => {
            for tool in Tool::ALL {
                if tools.iter().any(|t| t == tool.program()) {
                    println!(
                        "  {} {:<16} install package: {}",
                        style("✗").red(),
                        tool.program(),
                        tool.package_hint()
                    );
                }
            }
            println!();
            Err(CliError::Batch(ContourError::ToolUnavailable { tools }))
        }
        Err(e) => Err(e.into()),
    }
}
