//! Route definitions for render jobs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{downloads, jobs};
use crate::state::AppState;

/// Job routes, mounted under `/api`.
///
/// ```text
/// POST   /generate        -> submit_job
/// GET    /job-status      -> job_status
/// GET    /download        -> download_artifact
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(jobs::submit_job))
        .route("/job-status", get(jobs::job_status))
        .route("/download", get(downloads::download_artifact))
}
