use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use learnimation_api::config::{LogFormat, ServerConfig};
use learnimation_api::router::build_app_router;
use learnimation_api::state::AppState;
use learnimation_core::render::RenderSupervisor;
use learnimation_core::workspace::JobStore;
use learnimation_generator::SpecGenerator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = LogFormat::from_env() == LogFormat::Json;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "learnimation_api=debug,learnimation_core=debug,learnimation_generator=debug,\
             tower_http=debug"
                .into()
        }))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Job storage ---
    tokio::fs::create_dir_all(&config.storage_root)
        .await
        .expect("Failed to create storage root");
    let jobs = Arc::new(JobStore::new(config.storage_root.clone()));
    tracing::info!(root = %config.storage_root.display(), "Job storage ready");

    // --- Render supervisor ---
    let supervisor = Arc::new(RenderSupervisor::new(
        config.render.command.clone(),
        config.render.timeout(),
    ));
    tracing::info!(
        program = %config.render.command.program,
        quality = %config.render.command.quality,
        timeout_secs = config.render.timeout_secs,
        "Render supervisor started"
    );

    // --- Specification generator ---
    let generator = match config.generator.clone() {
        Some(generator_config) => {
            let model = generator_config.model.clone();
            let generator = SpecGenerator::new(generator_config)
                .expect("Failed to build specification generator");
            tracing::info!(%model, "Specification generator enabled");
            Some(Arc::new(generator))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, specification generator disabled");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        jobs,
        supervisor: Arc::clone(&supervisor),
        generator,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if supervisor.shutdown(grace).await {
        tracing::info!("Render jobs stopped");
    } else {
        tracing::warn!(
            remaining = supervisor.in_flight(),
            "Render jobs still finishing after shutdown timeout"
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
