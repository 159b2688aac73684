/// Domain errors for render jobs.
///
/// Worker lifecycle failures are not represented here: once a job has been
/// launched its failures are written to the job log, not returned to a caller.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),

    #[error("Invalid job id: {0}")]
    InvalidJobId(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Path traversal rejected: {0}")]
    PathTraversal(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Wrap an I/O error with a short description of the failed operation.
    pub fn storage(context: &str, err: std::io::Error) -> Self {
        Self::Storage(format!("{context}: {err}"))
    }
}
