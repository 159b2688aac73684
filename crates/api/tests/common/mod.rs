#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::{NamedTempFile, TempDir};
use tower::ServiceExt;

use learnimation_api::config::{RenderConfig, ServerConfig};
use learnimation_api::router::build_app_router;
use learnimation_api::state::AppState;
use learnimation_core::render::{RenderCommand, RenderQuality, RenderSupervisor};
use learnimation_core::workspace::JobStore;
use learnimation_generator::{GeneratorConfig, SpecGenerator};

/// Worker that waits for a `go` file in its job directory, reports
/// progress, then writes `render.mp4`.
pub const GATED_WORKER: &str = r#"
JOBDIR="$(dirname "$OUTDIR")"
while [ ! -f "$JOBDIR/go" ]; do sleep 0.05; done
printf 'Animation 0: 50%%\r'
printf 'fake mp4 payload' > "$OUTDIR/render.mp4"
echo "rendered"
"#;

/// A running application over a throwaway storage root.
pub struct TestApp {
    pub app: Router,
    pub storage: TempDir,
    pub supervisor: Arc<RenderSupervisor>,
    _worker: Option<NamedTempFile>,
}

impl TestApp {
    /// Directory of job `id` under the storage root.
    pub fn job_dir(&self, id: &str) -> PathBuf {
        self.storage.path().join(id)
    }

    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_root: &Path, command: RenderCommand, timeout_secs: u64) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        storage_root: storage_root.to_path_buf(),
        render: RenderConfig {
            command,
            timeout_secs,
        },
        generator: None,
    }
}

/// Write a `sh` worker whose body can use `$OUTDIR` and `$INPUT`.
pub fn write_worker_script(body: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".sh")
        .tempfile()
        .expect("create worker script");
    writeln!(
        f,
        r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --input) INPUT="$2"; shift ;;
    --outdir) OUTDIR="$2"; shift ;;
  esac
  shift
done"#
    )
    .expect("write argument parsing");
    write!(f, "{body}").expect("write body");
    f.flush().expect("flush script");
    f
}

/// Build the full application router, rendering with a `sh` worker running
/// `worker_body`.
pub fn build_test_app(worker_body: &str) -> TestApp {
    build_test_app_with(worker_body, 30, None)
}

pub fn build_test_app_with(
    worker_body: &str,
    render_timeout_secs: u64,
    generator: Option<GeneratorConfig>,
) -> TestApp {
    let worker = write_worker_script(worker_body);
    let command = RenderCommand {
        program: "sh".into(),
        script: Some(worker.path().to_path_buf()),
        scene_class: "GeneratedScene".into(),
        quality: RenderQuality::Low,
    };
    let mut app = build_test_app_for(command, render_timeout_secs, generator);
    app._worker = Some(worker);
    app
}

/// Build the application around an arbitrary worker command.
pub fn build_test_app_for(
    command: RenderCommand,
    render_timeout_secs: u64,
    generator: Option<GeneratorConfig>,
) -> TestApp {
    let storage = tempfile::tempdir().expect("create storage root");
    let mut config = test_config(storage.path(), command, render_timeout_secs);
    config.generator = generator;

    let supervisor = Arc::new(RenderSupervisor::new(
        config.render.command.clone(),
        config.render.timeout(),
    ));
    let generator = config
        .generator
        .clone()
        .map(|g| Arc::new(SpecGenerator::new(g).expect("build generator")));

    let state = AppState {
        config: Arc::new(config.clone()),
        jobs: Arc::new(JobStore::new(storage.path())),
        supervisor: Arc::clone(&supervisor),
        generator,
    };

    TestApp {
        app: build_app_router(state, &config),
        storage,
        supervisor,
        _worker: None,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, json: &serde_json::Value) -> Response<Body> {
    post_raw(app, uri, &json.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `/api/job-status` until `accept` returns true or `timeout` elapses.
pub async fn poll_status<F>(app: &Router, job_id: &str, timeout: Duration, accept: F) -> serde_json::Value
where
    F: Fn(&serde_json::Value) -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let response = get(app.clone(), &format!("/api/job-status?jobId={job_id}")).await;
        let status = body_json(response).await;
        if accept(&status) {
            return status;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {job_id} never reached the expected state, last status: {status}"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
