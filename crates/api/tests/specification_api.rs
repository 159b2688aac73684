//! Integration tests for free-text specification generation.

mod common;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use common::{body_json, post_json};
use learnimation_generator::GeneratorConfig;

/// Serve a fake completion endpoint that always answers with `content`.
async fn fake_completions(status: StatusCode, content: &'static str) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move || async move {
            let reply = json!({"choices": [{"message": {"role": "assistant", "content": content}}]});
            (status, Json(reply))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn generator_at(api_url: String) -> Option<GeneratorConfig> {
    Some(GeneratorConfig {
        api_url,
        api_key: "test-key".into(),
        model: "test-model".into(),
    })
}

#[tokio::test]
async fn returns_generated_document_without_rendering() {
    let url = fake_completions(
        StatusCode::OK,
        r#"Here it is: {"title": "Swap demo", "scenes": [
            {"type": "array_display", "duration": 2, "values": [2, 1]},
            {"type": "swap", "duration": 1.5, "i": 0, "j": 1},
        ]}"#,
    )
    .await;
    let test = common::build_test_app_with("exit 0\n", 30, generator_at(url));

    let response = post_json(
        test.router(),
        "/api/specification",
        &json!({"text": "show a swap"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalDuration"], 3.5);
    assert_eq!(json["dsl"]["title"], "Swap demo");
    assert_eq!(json["dsl"]["fps"], 30);

    let jobs = std::fs::read_dir(test.storage.path()).unwrap().count();
    assert_eq!(jobs, 0);
}

#[tokio::test]
async fn declined_generation_returns_502() {
    let url = fake_completions(StatusCode::OK, r#"{"error": "not an animation"}"#).await;
    let test = common::build_test_app_with("exit 0\n", 30, generator_at(url));

    let response = post_json(
        test.router(),
        "/api/specification",
        &json!({"text": "write me a poem"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_GENERATION_FAILED");
}

#[tokio::test]
async fn upstream_error_status_returns_502() {
    let url = fake_completions(StatusCode::UNAUTHORIZED, "").await;
    let test = common::build_test_app_with("exit 0\n", 30, generator_at(url));

    let response = post_json(
        test.router(),
        "/api/specification",
        &json!({"text": "draw a circle"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn empty_text_returns_400() {
    let url = fake_completions(StatusCode::OK, "{}").await;
    let test = common::build_test_app_with("exit 0\n", 30, generator_at(url));

    let response = post_json(test.router(), "/api/specification", &json!({"text": "  "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Empty input");
}

#[tokio::test]
async fn unconfigured_generator_returns_503() {
    let test = common::build_test_app("exit 0\n");

    let response = post_json(
        test.router(),
        "/api/specification",
        &json!({"text": "draw a circle"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATOR_UNAVAILABLE");
}
