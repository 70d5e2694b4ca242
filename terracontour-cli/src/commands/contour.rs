//! Contour command - converts DEM files into contour tile packages.

use std::path::PathBuf;
use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use terracontour::format::format_duration;
use terracontour::logging::{self, LogConfig};
use terracontour::{
    BatchConfig, BatchResult, Concurrency, ConfigFile, ContourBatch, ProcessGateway,
    ProgressUpdate,
};
use tracing::debug;

use crate::error::CliError;

/// Progress bar template.
const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}";

/// Arguments for the contour command.
pub struct ContourArgs {
    pub output_dir: PathBuf,
    pub dem_files: Vec<PathBuf>,
    pub startover: bool,
    pub removesource: bool,
    pub merge: bool,
    pub debug: bool,
    pub threads: Option<String>,
    pub config: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

/// Run the contour command.
pub async fn run(args: ContourArgs) -> Result<(), CliError> {
    let file = match &args.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    let _guard = logging::init(&LogConfig::new(args.debug).with_log_dir(args.log_dir.clone()))?;

    let concurrency = resolve_concurrency(args.threads.as_deref(), file.threads);
    debug!(
        threads = concurrency.get(),
        settings = ?file.settings,
        "Resolved batch configuration"
    );
    let gateway = Arc::new(ProcessGateway::new(file.settings.tool_timeout));

    let config = BatchConfig::new(&args.output_dir)
        .with_overwrite(args.startover)
        .with_delete_source(args.removesource)
        .with_merge(args.merge)
        .with_debug(args.debug)
        .with_concurrency(concurrency)
        .with_settings(file.settings);

    println!("Terracontour");
    println!("============");
    println!();
    println!("Output:   {}", args.output_dir.display());
    println!("Files:    {}", args.dem_files.len());
    println!("Threads:  {}", concurrency.get());
    if args.startover {
        println!("Mode:     start over (checkpoint discarded)");
    }
    println!();

    let bar = progress_bar(args.dem_files.len());
    let observer = bar.clone();

    let batch = ContourBatch::new(config, gateway).with_progress(Box::new(
        move |update: &ProgressUpdate<'_>| {
            observer.set_length(update.totals.total as u64);
            observer.set_position(update.totals.finished() as u64);
            observer.set_message(format!(
                "{} {}",
                update.report.job.source_name(),
                update.report.outcome.label()
            ));
        },
    ));

    let result = batch.run(args.dem_files).await;
    bar.finish_and_clear();

    let result = result?;
    print_summary(&result);
    Ok(())
}

/// CLI flag wins over the config file; both are coerced the same way.
fn resolve_concurrency(flag: Option<&str>, file: Option<i64>) -> Concurrency {
    match (flag, file) {
        (Some(value), _) => Concurrency::from_arg(value),
        (None, Some(value)) => Concurrency::new(value),
        (None, None) => Concurrency::default(),
    }
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stdout());
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    bar.set_style(style);
    bar
}

fn print_summary(result: &BatchResult) {
    println!();
    println!("Summary");
    println!("-------");
    println!(
        "  {} of {} files processed in {}",
        style(result.succeeded).green().bold(),
        result.total,
        format_duration(result.duration)
    );
    if result.skipped > 0 {
        println!("  {} already processed", result.skipped);
    }
    if result.empty > 0 {
        println!("  {} without contours", result.empty);
    }
    if result.failed > 0 {
        println!("  {} failed:", style(result.failed).red().bold());
        for (job, reason) in &result.failures {
            println!("    {} {}", style(job).yellow(), reason);
        }
    }
    for path in &result.merged {
        println!("  merged: {}", path.display());
    }
}
