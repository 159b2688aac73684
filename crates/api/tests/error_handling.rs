//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server is
//! involved.

use assert_matches::assert_matches;
use axum::body::Body;
use axum::extract::FromRequest;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use http_body_util::BodyExt;
use learnimation_api::error::AppError;
use learnimation_core::error::CoreError;
use learnimation_generator::error::GeneratorError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Core errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_specification_returns_400_with_details() {
    let err = AppError::Core(CoreError::InvalidSpecification(
        "need a 'scenes' array".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_SPECIFICATION");
    assert_eq!(json["error"], "Invalid specification: need a 'scenes' array");
}

#[tokio::test]
async fn path_traversal_does_not_echo_input() {
    let err = AppError::Core(CoreError::PathTraversal("file '../../x' escapes".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "PATH_TRAVERSAL_REJECTED");
    assert_eq!(json["error"], "invalid input");
}

#[tokio::test]
async fn job_not_found_returns_404() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::JobNotFound("abc".into()))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "JOB_NOT_FOUND");
}

#[tokio::test]
async fn invalid_job_id_returns_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::InvalidJobId("jobId required".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "jobId required");
}

#[tokio::test]
async fn storage_error_is_sanitized() {
    let err = AppError::Core(CoreError::Storage(
        "create /srv/jobs/abc: permission denied".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "STORAGE_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("/srv"));
}

// ---------------------------------------------------------------------------
// Generator errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generator_input_errors_return_400() {
    let (status, json) = error_to_response(AppError::Generator(GeneratorError::InputTooLong {
        limit: 8000,
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Input too long (limit 8000 chars)");
}

#[tokio::test]
async fn upstream_failures_return_502() {
    for err in [
        GeneratorError::Api {
            status: 500,
            body: "oops".into(),
        },
        GeneratorError::Declined("nope".into()),
        GeneratorError::SchemaViolation {
            details: vec!["bad".into()],
        },
    ] {
        let (status, json) = error_to_response(AppError::Generator(err)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "UPSTREAM_GENERATION_FAILED");
    }
}

#[tokio::test]
async fn unconfigured_generator_returns_503() {
    let (status, json) = error_to_response(AppError::GeneratorUnavailable).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "GENERATOR_UNAVAILABLE");
}

#[tokio::test]
async fn bad_request_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("nope".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "nope");
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

#[test]
fn domain_errors_convert_into_matching_variants() {
    assert_matches!(
        AppError::from(CoreError::JobNotFound("abc".into())),
        AppError::Core(CoreError::JobNotFound(id)) if id == "abc"
    );
    assert_matches!(
        AppError::from(GeneratorError::InputTooLong { limit: 8000 }),
        AppError::Generator(GeneratorError::InputTooLong { limit: 8000 })
    );
}

#[tokio::test]
async fn json_rejection_becomes_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .body(Body::from("{}"))
        .unwrap();
    let rejection = Json::<serde_json::Value>::from_request(request, &())
        .await
        .unwrap_err();

    let err = AppError::from(rejection);

    assert_matches!(&err, AppError::BadRequest(msg) if msg.contains("Content-Type"));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}
