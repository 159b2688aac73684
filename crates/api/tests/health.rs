//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let test = common::build_test_app("exit 0\n");
    let response = get(test.router(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["generator_available"], false);
    assert_eq!(json["in_flight_jobs"], 0);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let test = common::build_test_app("exit 0\n");
    let response = get(test.router(), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let test = common::build_test_app("exit 0\n");
    let response = get(test.router(), "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    // The value should be a valid UUID (36 chars with hyphens).
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let test = common::build_test_app("exit 0\n");

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/generate")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = test.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .expect("Missing Access-Control-Allow-Origin header"),
        "http://localhost:3000"
    );
    let allow_methods = headers
        .get("access-control-allow-methods")
        .expect("Missing Access-Control-Allow-Methods header")
        .to_str()
        .unwrap();
    assert!(
        allow_methods.contains("POST"),
        "Allow-Methods should contain POST, got: {allow_methods}"
    );
}

// ---------------------------------------------------------------------------
// Test: a caller-supplied x-request-id is echoed back unchanged
// ---------------------------------------------------------------------------

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let test = common::build_test_app("exit 0\n");

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-chosen-id")
        .body(Body::empty())
        .unwrap();
    let response = test.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "client-chosen-id");
}

// ---------------------------------------------------------------------------
// Test: preflight only advertises the methods the API serves
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_limits_methods() {
    let test = common::build_test_app("exit 0\n");

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/job-status")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();
    let response = test.router().oneshot(request).await.unwrap();

    let headers = response.headers();
    let allow_methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(allow_methods.contains("GET"));
    assert!(!allow_methods.contains("PUT"));
    assert!(!allow_methods.contains("DELETE"));
    assert_eq!(headers["access-control-max-age"], "3600");
}
