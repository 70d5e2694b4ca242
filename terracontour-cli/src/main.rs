//! Terracontour CLI - Command-line interface
//!
//! Converts DEM files into contour mbtiles with the terracontour library.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use commands::contour::ContourArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "terracontour", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate contour tile packages from DEM files
    Contour {
        /// Directory for tile packages and the checkpoint file
        output_dir: PathBuf,

        /// DEM files to convert
        #[arg(required = true)]
        dem_files: Vec<PathBuf>,

        /// Discard the checkpoint and reprocess every file
        #[arg(long)]
        startover: bool,

        /// Delete each DEM file after it was converted
        #[arg(long)]
        removesource: bool,

        /// Join all packages into merged_<unit>.mbtiles afterwards
        #[arg(long)]
        merge: bool,

        /// Log stage commands and tool output
        #[arg(long)]
        debug: bool,

        /// Files processed in parallel (invalid values mean 1)
        #[arg(long, value_name = "N")]
        threads: Option<String>,

        /// Config file [default: ~/.terracontour/config.ini]
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Also write terracontour.log into this directory
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },

    /// Check that all required tools are installed
    Tools,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Contour {
            output_dir,
            dem_files,
            startover,
            removesource,
            merge,
            debug,
            threads,
            config,
            log_dir,
        } => {
            commands::contour::run(ContourArgs {
                output_dir,
                dem_files,
                startover,
                removesource,
                merge,
                debug,
                threads,
                config,
                log_dir,
            })
            .await
        }
        Commands::Tools => commands::tools::run().await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
