use std::sync::Arc;

use learnimation_core::render::RenderSupervisor;
use learnimation_core::workspace::JobStore;
use learnimation_generator::SpecGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Job state lives on disk; nothing here tracks individual jobs.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Job workspaces under the configured storage root.
    pub jobs: Arc<JobStore>,
    /// Starts render workers and owns their supervision tasks.
    pub supervisor: Arc<RenderSupervisor>,
    /// `None` when no completion API is configured.
    pub generator: Option<Arc<SpecGenerator>>,
}
