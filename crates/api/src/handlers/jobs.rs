//! Handlers for render job submission and status polling.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use learnimation_core::job::{status_url, JobId};
use learnimation_core::status::{read_status, JobStatus};

use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status_url: String,
}

#[derive(Debug, Deserialize)]
pub struct JobStatusParams {
    #[serde(rename = "jobId", default)]
    pub job_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/generate
///
/// Materialize a job for the posted specification and start its render
/// worker in the background. Returns 202 as soon as the workspace exists;
/// the worker's progress is only observable through `/api/job-status`.
pub async fn submit_job(
    State(state): State<AppState>,
    AppJson(spec): AppJson<Value>,
) -> AppResult<impl IntoResponse> {
    let workspace = state.jobs.create_job(&spec).await?;
    let response = SubmitJobResponse {
        job_id: workspace.id.to_string(),
        status_url: status_url(&workspace.id),
    };

    tracing::info!(job_id = %workspace.id, "Render job submitted");
    state.supervisor.launch(workspace);

    Ok((StatusCode::ACCEPTED, Json(response)))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/job-status?jobId=<id>
pub async fn job_status(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<JobStatusParams>,
) -> AppResult<Json<JobStatus>> {
    let id = JobId::parse(params.job_id.as_deref().unwrap_or_default())?;
    let status = read_status(&state.jobs, &id).await?;
    Ok(Json(status))
}
