use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use learnimation_core::error::CoreError;
use learnimation_generator::error::GeneratorError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`GeneratorError`] and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{ "error": <message>, "code": <CODE> }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `learnimation_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure to turn free text into a specification.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// No completion API key is configured.
    #[error("Specification generator is not configured")]
    GeneratorUnavailable,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::InvalidSpecification(_) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_SPECIFICATION",
                    core.to_string(),
                ),
                CoreError::InvalidJobId(msg) | CoreError::BadRequest(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
                }
                CoreError::PathTraversal(_) => (
                    StatusCode::BAD_REQUEST,
                    "PATH_TRAVERSAL_REJECTED",
                    "invalid input".to_string(),
                ),
                CoreError::JobNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "JOB_NOT_FOUND",
                    "job not found".to_string(),
                ),
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                CoreError::Storage(msg) => {
                    tracing::error!(error = %msg, "Storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_ERROR",
                        "A storage error occurred".to_string(),
                    )
                }
            },

            // --- Generator errors ---
            AppError::Generator(err) if err.is_input_error() => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
            }
            AppError::Generator(err) => {
                tracing::warn!(error = %err, "Specification generation failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_GENERATION_FAILED",
                    err.to_string(),
                )
            }
            AppError::GeneratorUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "GENERATOR_UNAVAILABLE",
                self.to_string(),
            ),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
