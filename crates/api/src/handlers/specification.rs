//! Handler for turning free text into a specification document.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use learnimation_generator::GeneratedSpecification;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateSpecificationRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/specification
///
/// Returns the generated document for review. Nothing is rendered; the
/// client submits the returned `dsl` to `/api/generate` itself.
pub async fn generate_specification(
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateSpecificationRequest>,
) -> AppResult<Json<GeneratedSpecification>> {
    let generator = state
        .generator
        .as_ref()
        .ok_or(AppError::GeneratorUnavailable)?;

    let generated = generator.generate(&input.text).await?;
    Ok(Json(generated))
}
