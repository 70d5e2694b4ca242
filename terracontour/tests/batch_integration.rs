//! Integration tests for complete contour batches.
//!
//! These tests drive [`ContourBatch`] end to end against a scripted tool
//! gateway that behaves like GDAL and tippecanoe:
//! - Outcome counting for mixed batches (completed, empty, failed)
//! - Checkpoint persistence, start-over and resume
//! - Cleanup of job-scoped artifacts and prefilter scripts
//! - The concurrency bound and the merge pass
//!
//! Run with: `cargo test --test batch_integration`

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use terracontour::gateway::{BoxFuture, CommandOutput, GatewayError, ToolCommand};
use terracontour::{
    BatchConfig, CheckpointStore, Concurrency, ContourBatch, ContourError, ProgressUpdate, Tool,
    ToolGateway,
};

// ============================================================================
// Scripted Tools
// ============================================================================

const GDALINFO: &str = r#"{"size":[3601,3601],"coordinateSystem":{"wkt":"GEOGCRS[\"WGS 84\",ID[\"EPSG\",4326]]"},"cornerCoordinates":{"upperLeft":[11.0,48.0],"lowerLeft":[11.0,47.0],"lowerRight":[12.0,47.0],"upperRight":[12.0,48.0],"center":[11.5,47.5]}}"#;

const GDALINFO_NO_PROJECTION: &str = r#"{"size":[3601,3601],"cornerCoordinates":{"upperLeft":[0,0],"lowerLeft":[0,3601],"lowerRight":[3601,3601],"upperRight":[3601,0],"center":[1800.5,1800.5]}}"#;

/// Gateway answering like the real tools.
///
/// Behaviour depends on the DEM file name:
/// - `flat*` yields zero features in every unit system
/// - `broken*` makes tippecanoe fail
/// - `half*` makes tippecanoe fail for the imperial package only
/// - `noproj*` has no coordinate system
///
/// Version probes are answered but not counted as invocations.
struct ScriptedTools {
    missing: Vec<Tool>,
    delay: Duration,
    invocations: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedTools {
    fn new() -> Self {
        Self {
            missing: Vec::new(),
            delay: Duration::ZERO,
            invocations: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn without(mut self, tools: &[Tool]) -> Self {
        self.missing = tools.to_vec();
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn answer(&self, command: &ToolCommand) -> CommandOutput {
        let active = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);
        self.invocations.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(out) = &command.output {
            std::fs::write(out, "artifact").unwrap();
        }

        let line = command.command_line();
        let (exit, stdout, stderr) = match command.tool {
            Tool::GdalInfo if line.contains("noproj") => {
                (0, GDALINFO_NO_PROJECTION.to_string(), String::new())
            }
            Tool::GdalInfo => (0, GDALINFO.to_string(), String::new()),
            Tool::Tippecanoe if line.contains("broken") => (
                1,
                String::new(),
                "tmp_broken.hgt_metric_contour.geojson:1: Expected a geometry\n".to_string(),
            ),
            Tool::Tippecanoe if line.contains("half") && line.contains("ele_ft") => (
                1,
                String::new(),
                "tmp_half.hgt_imperial_contour.geojson:9: Found EOF in string\n".to_string(),
            ),
            Tool::Tippecanoe if line.contains("flat") => (
                0,
                String::new(),
                "0 features, 0 bytes of geometry, 4 bytes of string pool\n".to_string(),
            ),
            Tool::Tippecanoe => (
                0,
                String::new(),
                "1822 features, 402119 bytes of geometry, 12 bytes of string pool\n".to_string(),
            ),
            Tool::TileJoin => (0, String::new(), "13/4352/2880  \n".to_string()),
            _ => (0, String::new(), String::new()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        CommandOutput::evaluate(command.tool, Some(exit), stdout, stderr)
    }
}

impl ToolGateway for ScriptedTools {
    fn execute<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> BoxFuture<'a, Result<CommandOutput, GatewayError>> {
        Box::pin(async move {
            if self.missing.contains(&command.tool) {
                return Err(GatewayError::Spawn {
                    tool: command.tool,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                });
            }
            if command.args == ["--version"] {
                let text = match command.tool {
                    Tool::Tippecanoe | Tool::TileJoin => "tippecanoe v2.53.0",
                    Tool::Jq => "jq-1.7.1",
                    _ => "GDAL 3.8.4, released 2024/02/08",
                };
                return Ok(CommandOutput::evaluate(
                    command.tool,
                    Some(0),
                    text.to_string(),
                    String::new(),
                ));
            }
            Ok(self.answer(command).await)
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

struct Workspace {
    dems: TempDir,
    out: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dems: TempDir::new().unwrap(),
            out: TempDir::new().unwrap(),
        }
    }

    /// Create DEM files with the given names.
    fn dems(&self, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = self.dems.path().join(name);
                std::fs::write(&path, "dem").unwrap();
                path
            })
            .collect()
    }

    fn config(&self) -> BatchConfig {
        BatchConfig::new(self.out.path())
    }

    fn output(&self, name: &str) -> PathBuf {
        self.out.path().join(name)
    }

    async fn checkpoint(&self) -> CheckpointStore {
        CheckpointStore::load(self.config().checkpoint_path())
            .await
            .unwrap()
    }

    /// Files left in the output directory that belong to a running job.
    fn leftovers(&self) -> Vec<String> {
        std::fs::read_dir(self.out.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("tmp_") || n.ends_with("_prefilter.sh"))
            .collect()
    }
}

fn key(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Mixed batch: one file completes, one is empty, two fail.
#[tokio::test]
async fn test_mixed_batch_counts_every_outcome() {
    let ws = Workspace::new();
    let files = ws.dems(&["N47E011.hgt", "flat.hgt", "broken.hgt", "noproj.tif"]);
    let tools = Arc::new(ScriptedTools::new());

    let result = ContourBatch::new(ws.config().with_concurrency(Concurrency::new(2)), tools)
        .run(files.clone())
        .await
        .unwrap();

    assert_eq!(result.total, 4);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.empty, 1);
    assert_eq!(result.failed, 2);
    assert_eq!(result.skipped, 0);
    assert!(result.is_complete());
    assert_eq!(result.failures.len(), 2);

    let checkpoint = ws.checkpoint().await.snapshot().await;
    assert_eq!(checkpoint.len(), 2);
    assert!(checkpoint.get(key(&files[0])).unwrap().completed);
    assert!(checkpoint.get(key(&files[1])).unwrap().empty);
    assert!(checkpoint.get(key(&files[2])).is_none());
    assert!(checkpoint.get(key(&files[3])).is_none());

    assert!(ws.output("N47E011.hgt_metric.mbtiles").exists());
    assert!(ws.output("N47E011.hgt_imperial.mbtiles").exists());
    assert!(!ws.output("flat.hgt_metric.mbtiles").exists());
    assert!(!ws.output("broken.hgt_metric.mbtiles").exists());
}

/// A failing job does not stop the others and leaves no record.
#[tokio::test]
async fn test_failure_is_isolated() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "broken.hgt", "c.hgt"]);
    let tools = Arc::new(ScriptedTools::new());

    let result = ContourBatch::new(ws.config().with_concurrency(Concurrency::new(2)), tools)
        .run(files.clone())
        .await
        .unwrap();

    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 1);
    assert!(result.failures[0].1.contains("tile packaging"));

    let checkpoint = ws.checkpoint().await.snapshot().await;
    assert_eq!(checkpoint.len(), 2);
    assert!(checkpoint.get(key(&files[1])).is_none());
}

/// Every job-scoped artifact and both prefilter scripts are removed.
#[tokio::test]
async fn test_no_artifacts_left_behind() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "flat.hgt", "broken.hgt"]);
    let tools = Arc::new(ScriptedTools::new());

    ContourBatch::new(ws.config(), tools)
        .run(files)
        .await
        .unwrap();

    assert!(ws.leftovers().is_empty(), "left over: {:?}", ws.leftovers());
}

/// Re-running a finished batch executes no tool besides the version probes.
#[tokio::test]
async fn test_rerun_is_idempotent() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "b.hgt", "flat.hgt"]);

    let first = Arc::new(ScriptedTools::new());
    ContourBatch::new(ws.config(), first.clone())
        .run(files.clone())
        .await
        .unwrap();
    assert!(first.invocations() > 0);

    let before = std::fs::read_to_string(ws.config().checkpoint_path()).unwrap();

    let second = Arc::new(ScriptedTools::new());
    let result = ContourBatch::new(ws.config(), second.clone())
        .run(files)
        .await
        .unwrap();

    assert_eq!(second.invocations(), 0);
    assert_eq!(result.skipped, 3);
    assert_eq!(result.succeeded, 0);
    assert!(result.merged.is_empty());

    let after = std::fs::read_to_string(ws.config().checkpoint_path()).unwrap();
    assert_eq!(before, after);
}

/// Deleting a recorded output re-queues its job on the next run.
#[tokio::test]
async fn test_resume_reprocesses_missing_output() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "b.hgt"]);

    ContourBatch::new(ws.config(), Arc::new(ScriptedTools::new()))
        .run(files.clone())
        .await
        .unwrap();

    std::fs::remove_file(ws.output("a.hgt_metric.mbtiles")).unwrap();

    let tools = Arc::new(ScriptedTools::new());
    let result = ContourBatch::new(ws.config(), tools.clone())
        .run(files)
        .await
        .unwrap();

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.skipped, 1);
    assert!(tools.invocations() > 0);
    assert!(ws.output("a.hgt_metric.mbtiles").exists());
}

/// Starting over discards every earlier record.
#[tokio::test]
async fn test_start_over_discards_checkpoint() {
    let ws = Workspace::new();
    let earlier = ws.dems(&["p1.hgt", "p2.hgt", "p3.hgt", "p4.hgt", "p5.hgt"]);
    ContourBatch::new(ws.config(), Arc::new(ScriptedTools::new()))
        .run(earlier)
        .await
        .unwrap();
    assert_eq!(ws.checkpoint().await.snapshot().await.len(), 5);

    let files = ws.dems(&["new.hgt"]);
    let result = ContourBatch::new(
        ws.config().with_overwrite(true),
        Arc::new(ScriptedTools::new()),
    )
    .run(files.clone())
    .await
    .unwrap();

    assert_eq!(result.succeeded, 1);
    let checkpoint = ws.checkpoint().await.snapshot().await;
    assert_eq!(checkpoint.len(), 1);
    assert!(checkpoint.get(key(&files[0])).is_some());
}

/// Starting over reprocesses files that were already recorded.
#[tokio::test]
async fn test_start_over_reprocesses_recorded_files() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt"]);
    ContourBatch::new(ws.config(), Arc::new(ScriptedTools::new()))
        .run(files.clone())
        .await
        .unwrap();

    let tools = Arc::new(ScriptedTools::new());
    let result = ContourBatch::new(ws.config().with_overwrite(true), tools.clone())
        .run(files)
        .await
        .unwrap();

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.skipped, 0);
    assert!(tools.invocations() > 0);
}

/// No more jobs run at once than the configured concurrency.
#[tokio::test]
async fn test_concurrency_bound() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "b.hgt", "c.hgt", "d.hgt", "e.hgt", "f.hgt"]);
    let tools = Arc::new(ScriptedTools::new().with_delay(Duration::from_millis(10)));

    let result = ContourBatch::new(
        ws.config().with_concurrency(Concurrency::new(2)),
        tools.clone(),
    )
    .run(files)
    .await
    .unwrap();

    assert_eq!(result.succeeded, 6);
    assert!(tools.peak() <= 2, "peak was {}", tools.peak());
}

/// Sequential batches never overlap tool invocations.
#[tokio::test]
async fn test_single_worker_is_sequential() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "b.hgt", "c.hgt"]);
    let tools = Arc::new(ScriptedTools::new().with_delay(Duration::from_millis(5)));

    ContourBatch::new(ws.config(), tools.clone())
        .run(files)
        .await
        .unwrap();

    assert_eq!(tools.peak(), 1);
}

/// Merging joins the packages of each unit system once all jobs finished.
#[tokio::test]
async fn test_merge_after_batch() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "b.hgt", "flat.hgt"]);
    let tools = Arc::new(ScriptedTools::new());

    let result = ContourBatch::new(ws.config().with_merge(true), tools)
        .run(files)
        .await
        .unwrap();

    assert_eq!(
        result.merged,
        vec![
            ws.output("merged_metric.mbtiles"),
            ws.output("merged_imperial.mbtiles"),
        ]
    );
    assert!(ws.output("merged_metric.mbtiles").exists());
    assert!(!ws.output("merged_metric.mbtiles-journal").exists());
}

/// A job failing in a later unit leaves no package behind for the merge.
#[tokio::test]
async fn test_partially_packaged_failure_is_not_merged() {
    let ws = Workspace::new();
    let files = ws.dems(&["ok.hgt", "half.hgt"]);
    let tools = Arc::new(ScriptedTools::new());

    let result = ContourBatch::new(ws.config().with_merge(true), tools)
        .run(files.clone())
        .await
        .unwrap();

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);
    assert!(!ws.output("half.hgt_metric.mbtiles").exists());
    assert!(!ws.output("half.hgt_imperial.mbtiles").exists());
    assert!(ws.output("ok.hgt_metric.mbtiles").exists());
    assert_eq!(result.merged.len(), 2);

    let checkpoint = ws.checkpoint().await.snapshot().await;
    assert!(checkpoint.get(key(&files[1])).is_none());
}

/// A batch without new packages skips the merge.
#[tokio::test]
async fn test_merge_skipped_without_new_output() {
    let ws = Workspace::new();
    let files = ws.dems(&["flat.hgt", "broken.hgt"]);

    let result = ContourBatch::new(ws.config().with_merge(true), Arc::new(ScriptedTools::new()))
        .run(files)
        .await
        .unwrap();

    assert!(result.merged.is_empty());
    assert!(!ws.output("merged_metric.mbtiles").exists());
}

/// Sources are deleted only after they were recorded.
#[tokio::test]
async fn test_remove_source_keeps_failed_files() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "broken.hgt"]);

    ContourBatch::new(
        ws.config().with_delete_source(true),
        Arc::new(ScriptedTools::new()),
    )
    .run(files.clone())
    .await
    .unwrap();

    assert!(!files[0].exists());
    assert!(files[1].exists());
}

/// Duplicate paths are processed once.
#[tokio::test]
async fn test_duplicate_sources_collapse() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt"]);

    let result = ContourBatch::new(ws.config(), Arc::new(ScriptedTools::new()))
        .run(vec![files[0].clone(), files[0].clone()])
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.succeeded, 1);
}

/// Distinct sources with the same file name never share outputs.
#[tokio::test]
async fn test_same_file_name_fails_later_source() {
    let ws = Workspace::new();
    let files: Vec<PathBuf> = ["north", "south"]
        .iter()
        .map(|dir| {
            let path = ws.dems.path().join(dir).join("x.hgt");
            std::fs::create_dir(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "dem").unwrap();
            path
        })
        .collect();

    let result = ContourBatch::new(
        ws.config().with_concurrency(Concurrency::new(2)),
        Arc::new(ScriptedTools::new()),
    )
    .run(files.clone())
    .await
    .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);
    assert!(result.failures[0].1.contains("already used"));

    let checkpoint = ws.checkpoint().await.snapshot().await;
    assert_eq!(checkpoint.len(), 1);
    assert!(checkpoint.get(key(&files[0])).is_some());
    assert!(ws.output("x.hgt_metric.mbtiles").exists());
}

/// A missing tool aborts before any job or checkpoint exists.
#[tokio::test]
async fn test_missing_tool_aborts_batch() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt"]);
    let tools = Arc::new(ScriptedTools::new().without(&[Tool::Tippecanoe, Tool::Jq]));

    let err = ContourBatch::new(ws.config(), tools.clone())
        .run(files)
        .await
        .unwrap_err();

    match err {
        ContourError::ToolUnavailable { tools: missing } => {
            assert_eq!(missing, vec!["tippecanoe", "jq"]);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(tools.invocations(), 0);
    assert!(!ws.config().checkpoint_path().exists());
}

/// Progress is reported once per job with running totals.
#[tokio::test]
async fn test_progress_reports_each_job() {
    let ws = Workspace::new();
    let files = ws.dems(&["a.hgt", "b.hgt", "broken.hgt"]);
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();

    ContourBatch::new(ws.config(), Arc::new(ScriptedTools::new()))
        .with_progress(Box::new(move |update: &ProgressUpdate<'_>| {
            sink.lock().push(update.totals.finished());
        }))
        .run(files)
        .await
        .unwrap();

    assert_eq!(*seen.lock(), vec![1, 2, 3]);
}
