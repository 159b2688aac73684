//! Handler for fetching render artifacts.

use axum::extract::State;
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use learnimation_core::artifact::{
    inline_disposition, read_artifact, resolve_artifact_path, ARTIFACT_CONTENT_TYPE,
};

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    #[serde(rename = "jobId", default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// GET /api/download?jobId=<id>&file=<name>
///
/// Both parameters are checked for traversal before the filesystem is
/// touched. The whole artifact is returned inline as `video/mp4`.
pub async fn download_artifact(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<DownloadParams>,
) -> AppResult<impl IntoResponse> {
    let job_id = params.job_id.unwrap_or_default();
    let file = params.file.unwrap_or_default();

    let path = resolve_artifact_path(&state.jobs, &job_id, &file)?;
    let bytes = read_artifact(&path).await?;

    let disposition = HeaderValue::from_str(&inline_disposition(&file))
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    tracing::debug!(job_id = %job_id, file = %file, bytes = bytes.len(), "Serving artifact");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(ARTIFACT_CONTENT_TYPE)),
            (header::CONTENT_LENGTH, HeaderValue::from(bytes.len())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
