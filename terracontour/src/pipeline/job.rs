//! Job identity.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Identity of a job: the source path as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    /// Creates the identity of a source path.
    pub fn new(source: &Path) -> Self {
        Self(source.to_string_lossy().into_owned())
    }

    /// The identity as the checkpoint key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One DEM file to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Checkpoint key.
    pub id: JobId,

    /// The DEM file.
    pub source: PathBuf,

    /// Earlier job of the batch with the same file name, if any.
    pub name_taken_by: Option<JobId>,
}

impl Job {
    /// Creates a job for a DEM file.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        Self {
            id: JobId::new(&source),
            source,
            name_taken_by: None,
        }
    }

    /// File name of the source, used as the base of output names.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.as_str().to_string())
    }

    /// Builds jobs from paths, keeping the first of duplicate paths.
    ///
    /// Distinct paths sharing a file name would share output names; every
    /// such job after the first is marked with [`Job::name_taken_by`].
    pub fn collect_unique<I, P>(sources: I) -> Vec<Job>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        let mut names: HashMap<String, JobId> = HashMap::new();
        let mut jobs = Vec::new();

        for source in sources {
            let mut job = Job::new(source);
            if !seen.insert(job.id.clone()) {
                warn!(job = %job.id, "Ignoring duplicate input file");
                continue;
            }

            match names.get(&job.source_name()) {
                Some(first) => {
                    warn!(job = %job.id, first = %first, "File name already used in this batch");
                    job.name_taken_by = Some(first.clone());
                }
                None => {
                    names.insert(job.source_name(), job.id.clone());
                }
            }
            jobs.push(job);
        }

        jobs
    }
}
