//! Job status derived from the workspace on disk.
//!
//! There is no job table: every call re-reads the log and lists the output
//! directory. Reads are side-effect free and tolerate a log that is still
//! being written.

use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tokio::fs;

use crate::artifact::is_artifact;
use crate::error::CoreError;
use crate::job::JobId;
use crate::log_text::{non_blank_lines, sanitize_log, tail};
use crate::progress::extract_progress;
use crate::render::ExitMarker;
use crate::workspace::JobStore;

/// Number of non-blank log lines returned in `log_preview`.
pub const LOG_PREVIEW_LINES: usize = 12;

/// Lifecycle position of a job, as far as the log can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// No log yet: the worker has not been started.
    Pending,
    /// Log present without an exit marker.
    Running,
    /// The worker exited with code 0.
    Succeeded,
    /// Non-zero exit, killed by a signal, or the worker never started.
    Failed,
    TimedOut,
    Cancelled,
}

impl JobState {
    fn derive(log_present: bool, marker: Option<&ExitMarker>) -> Self {
        match marker {
            None if log_present => Self::Running,
            None => Self::Pending,
            Some(ExitMarker::Exited(0)) => Self::Succeeded,
            Some(ExitMarker::TimedOut { .. }) => Self::TimedOut,
            Some(ExitMarker::Cancelled) => Self::Cancelled,
            Some(_) => Self::Failed,
        }
    }
}

/// Snapshot returned to pollers.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    /// Every entry of `output/`, sorted by name.
    pub files: Vec<String>,
    /// Entries of `output/` that are render artifacts, sorted by name.
    #[serde(rename = "mp4s")]
    pub artifacts: Vec<String>,
    /// At least one artifact exists, whether or not the worker has exited.
    pub done: bool,
    pub log: String,
    pub log_preview: String,
    pub progress: Option<u8>,
    pub state: JobState,
    pub exit_code: Option<i32>,
}

/// Read the current status of `id`.
///
/// The log is read before the output directory is listed, so an exit
/// marker seen here is never newer than the listing.
pub async fn read_status(store: &JobStore, id: &JobId) -> Result<JobStatus, CoreError> {
    let workspace = store.open(id).await?;

    let raw_log = read_log(&workspace.log_path).await?;
    let (files, artifacts) = list_output(&workspace.output_dir).await?;

    let log_present = raw_log.is_some();
    let log = sanitize_log(&String::from_utf8_lossy(
        raw_log.as_deref().unwrap_or_default(),
    ));
    let lines = non_blank_lines(&log);
    let marker = ExitMarker::find_in(&lines);
    let log_preview = tail(&lines, LOG_PREVIEW_LINES);
    let progress = extract_progress(&lines);

    Ok(JobStatus {
        done: !artifacts.is_empty(),
        files,
        artifacts,
        log_preview,
        progress,
        state: JobState::derive(log_present, marker.as_ref()),
        exit_code: marker.as_ref().and_then(ExitMarker::exit_code),
        log,
    })
}

/// Current log bytes, or `None` if the worker has not started writing.
async fn read_log(path: &Path) -> Result<Option<Vec<u8>>, CoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoreError::storage("read render log", e)),
    }
}

/// List `output/` as `(all entries, artifacts)`. A missing directory is
/// an empty listing.
async fn list_output(dir: &Path) -> Result<(Vec<String>, Vec<String>), CoreError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok((Vec::new(), Vec::new())),
        Err(e) => return Err(CoreError::storage("list output directory", e)),
    };

    let mut files = Vec::new();
    let mut artifacts = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CoreError::storage("list output directory", e))?
    {
        // Names that are not valid UTF-8 cannot be requested for download.
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file && is_artifact(&name) {
            artifacts.push(name.clone());
        }
        files.push(name);
    }
    files.sort();
    artifacts.sort();
    Ok((files, artifacts))
}
