//! Job workspace creation and lookup.
//!
//! Every job owns `<root>/<id>/` holding the input specification, an
//! `output/` directory for the worker and the append-only render log. The
//! directory tree is the only persisted job state.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::CoreError;
use crate::job::{JobId, LOG_FILE_NAME, OUTPUT_DIR_NAME, SPEC_FILE_NAME};
use crate::specification::validate_specification;

/// Attempts at minting an unused id before giving up.
const MAX_ID_ATTEMPTS: usize = 4;

/// Paths of one job's workspace.
#[derive(Debug, Clone)]
pub struct JobWorkspace {
    pub id: JobId,
    pub dir: PathBuf,
    pub spec_path: PathBuf,
    pub output_dir: PathBuf,
    pub log_path: PathBuf,
}

impl JobWorkspace {
    fn at(root: &Path, id: JobId) -> Self {
        let dir = root.join(id.as_str());
        Self {
            spec_path: dir.join(SPEC_FILE_NAME),
            output_dir: dir.join(OUTPUT_DIR_NAME),
            log_path: dir.join(LOG_FILE_NAME),
            dir,
            id,
        }
    }
}

/// Root directory holding one subdirectory per job.
#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    /// A relative `root` is anchored to the current working directory
    /// here, since the worker runs inside the job directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: absolutize(&root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Workspace paths for `id`, without touching the filesystem.
    pub fn workspace(&self, id: &JobId) -> JobWorkspace {
        JobWorkspace::at(&self.root, id.clone())
    }

    /// Validate `spec`, allocate a fresh id and materialize its workspace.
    ///
    /// Nothing is written when validation fails. The specification file is
    /// created exclusively and written once.
    pub async fn create_job(&self, spec: &Value) -> Result<JobWorkspace, CoreError> {
        validate_specification(spec)?;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::storage("create storage root", e))?;

        let workspace = self.allocate().await?;
        fill_or_discard(&workspace, spec).await?;

        tracing::info!(job_id = %workspace.id, dir = %workspace.dir.display(), "Job workspace created");
        Ok(workspace)
    }

    /// Look up an existing job.
    pub async fn open(&self, id: &JobId) -> Result<JobWorkspace, CoreError> {
        let workspace = self.workspace(id);
        match fs::metadata(&workspace.dir).await {
            Ok(meta) if meta.is_dir() => Ok(workspace),
            Ok(_) => Err(CoreError::JobNotFound(id.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CoreError::JobNotFound(id.to_string()))
            }
            Err(e) => Err(CoreError::storage("stat job directory", e)),
        }
    }

    /// Create the job directory under a newly minted id.
    ///
    /// `create_dir` (not `create_dir_all`) fails on an existing directory,
    /// so an id is never shared between two jobs.
    async fn allocate(&self) -> Result<JobWorkspace, CoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let workspace = JobWorkspace::at(&self.root, JobId::generate());
            match fs::create_dir(&workspace.dir).await {
                Ok(()) => return Ok(workspace),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!(job_id = %workspace.id, "Job id collision, retrying");
                }
                Err(e) => return Err(CoreError::storage("create job directory", e)),
            }
        }
        Err(CoreError::Storage(
            "could not allocate an unused job id".into(),
        ))
    }
}

/// Resolve `path` against the current working directory.
///
/// Falls back to `path` unchanged when the working directory is unknown.
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Populate a freshly allocated workspace, removing it again on failure.
async fn fill_or_discard(workspace: &JobWorkspace, spec: &Value) -> Result<(), CoreError> {
    let result = fill(workspace, spec).await;
    if let Err(err) = &result {
        if let Err(cleanup) = fs::remove_dir_all(&workspace.dir).await {
            tracing::warn!(
                job_id = %workspace.id,
                error = %cleanup,
                "Failed to remove incomplete job directory"
            );
        }
        tracing::warn!(job_id = %workspace.id, error = %err, "Discarded incomplete job workspace");
    }
    result
}

async fn fill(workspace: &JobWorkspace, spec: &Value) -> Result<(), CoreError> {
    fs::create_dir_all(&workspace.output_dir)
        .await
        .map_err(|e| CoreError::storage("create output directory", e))?;

    let body = serde_json::to_vec_pretty(spec)
        .map_err(|e| CoreError::Storage(format!("serialize specification: {e}")))?;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&workspace.spec_path)
        .await
        .map_err(|e| CoreError::storage("create specification file", e))?;
    file.write_all(&body)
        .await
        .map_err(|e| CoreError::storage("write specification file", e))?;
    file.flush()
        .await
        .map_err(|e| CoreError::storage("flush specification file", e))?;
    Ok(())
}
