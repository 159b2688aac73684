use axum::routing::post;
use axum::Router;

use crate::handlers::specification;
use crate::state::AppState;

/// ```text
/// POST   /specification   -> generate_specification
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/specification", post(specification::generate_specification))
}
