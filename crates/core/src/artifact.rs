//! Artifact recognition and path-safe retrieval.
//!
//! Both the job id and the file name arrive straight from an untrusted
//! caller and end up in a filesystem path, so they are rejected on any
//! traversal token before the filesystem is touched, and the resolved path
//! must still lie inside the job's `output/` directory.

use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;
use crate::job::JobId;
use crate::workspace::JobStore;

/// File extension the worker uses for finished renders.
pub const ARTIFACT_EXTENSION: &str = "mp4";

/// Content type served for artifacts.
pub const ARTIFACT_CONTENT_TYPE: &str = "video/mp4";

/// Whether `name` is a render artifact.
pub fn is_artifact(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARTIFACT_EXTENSION))
}

/// Resolve `file` inside the output directory of job `job_id`.
///
/// Pure path arithmetic: the file is not required to exist.
pub fn resolve_artifact_path(
    store: &JobStore,
    job_id: &str,
    file: &str,
) -> Result<PathBuf, CoreError> {
    if job_id.is_empty() || file.is_empty() {
        return Err(CoreError::BadRequest("jobId and file required".into()));
    }
    if job_id.contains("..") || file.contains("..") {
        return Err(CoreError::PathTraversal("invalid input".into()));
    }

    let id = JobId::parse(job_id)?;
    let output_dir = store.workspace(&id).output_dir;

    let mut resolved = output_dir.clone();
    for component in Path::new(file).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(CoreError::PathTraversal(format!(
                    "file '{file}' escapes the output directory"
                )));
            }
        }
    }

    if resolved == output_dir {
        return Err(CoreError::BadRequest("file must name a file".into()));
    }
    if !resolved.starts_with(&output_dir) {
        return Err(CoreError::PathTraversal(format!(
            "file '{file}' escapes the output directory"
        )));
    }
    Ok(resolved)
}

/// Read a whole artifact.
///
/// Every failure is reported as the same [`CoreError::NotFound`] so callers
/// learn nothing about the filesystem layout.
pub async fn read_artifact(path: &Path) -> Result<Vec<u8>, CoreError> {
    tokio::fs::read(path).await.map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "Artifact read failed");
        CoreError::NotFound("file not found".into())
    })
}

/// `Content-Disposition` value that displays the artifact inline under its
/// own base name.
pub fn inline_disposition(file: &str) -> String {
    let name = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("inline; filename=\"{escaped}\"")
}
