pub mod health;
pub mod jobs;
pub mod specification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generate                  submit a specification for rendering (POST)
/// /job-status?jobId=         poll job status (GET)
/// /download?jobId=&file=     fetch a render artifact (GET)
///
/// /specification             generate a specification from text (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(jobs::router())
        .merge(specification::router())
}
