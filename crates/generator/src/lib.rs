//! Free-text to animation specification generation.
//!
//! A chat completions model is asked for a JSON document matching the DSL
//! schema. The reply is salvaged from surrounding prose, checked against
//! the schema and the duration cap, and has its frame rate normalized.
//! Nothing produced here is rendered automatically.

#![recursion_limit = "256"]

pub mod client;
pub mod error;
pub mod extract;
pub mod schema;

use serde::Serialize;
use serde_json::Value;

use learnimation_core::specification::{normalize_fps, total_duration, MAX_TOTAL_DURATION_SECS};

use crate::client::ChatClient;
use crate::error::GeneratorError;
use crate::extract::extract_json_object;
use crate::schema::{dsl_schema, DslValidator};

/// Longest accepted instruction, in characters.
pub const MAX_INPUT_CHARS: usize = 8000;

const SYSTEM_PROMPT: &str = "You are a JSON-only generator. Convert the user's plain-English \
instruction into a valid JSON object that conforms EXACTLY to the provided JSON Schema. Output \
ONLY the JSON, with no commentary, no code fences and no extra fields.\n\
If you cannot produce a valid JSON that satisfies the schema, respond with a JSON object: \
{ \"error\": \"<short explanation>\" }.\n\
Make scene durations realistic (0.5 - 12s each) and ensure total duration <= 180 seconds.";

/// Connection settings for the completion endpoint.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// A generated document ready to be shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSpecification {
    pub dsl: Value,
    #[serde(rename = "totalDuration")]
    pub total_duration: f64,
}

pub struct SpecGenerator {
    client: ChatClient,
    validator: DslValidator,
}

impl SpecGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        Ok(Self {
            client: ChatClient::new(config.api_url, config.api_key, config.model),
            validator: DslValidator::new()?,
        })
    }

    /// Generate a specification from a plain-language instruction.
    pub async fn generate(&self, text: &str) -> Result<GeneratedSpecification, GeneratorError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GeneratorError::EmptyInput);
        }
        if text.chars().count() > MAX_INPUT_CHARS {
            return Err(GeneratorError::InputTooLong {
                limit: MAX_INPUT_CHARS,
            });
        }

        let user_prompt = format!("Schema: {}\nUser instruction: {text}\nOutput:", dsl_schema());
        let raw = self.client.complete(SYSTEM_PROMPT, &user_prompt).await?;

        let generated = self.check_reply(&raw);
        match &generated {
            Ok(spec) => tracing::info!(
                model = %self.client.model(),
                total_duration = spec.total_duration,
                "Specification generated"
            ),
            Err(e) => tracing::warn!(model = %self.client.model(), error = %e, "Generation rejected"),
        }
        generated
    }

    /// Turn raw model output into a checked specification.
    pub fn check_reply(&self, raw: &str) -> Result<GeneratedSpecification, GeneratorError> {
        let mut dsl = extract_json_object(raw).ok_or_else(|| GeneratorError::Unparseable {
            raw: raw.to_string(),
        })?;

        if let Some(obj) = dsl.as_object() {
            if obj.len() == 1 {
                if let Some(reason) = obj.get("error") {
                    let reason = match reason {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    return Err(GeneratorError::Declined(reason));
                }
            }
        }

        self.validator
            .validate(&dsl)
            .map_err(|details| GeneratorError::SchemaViolation { details })?;

        let total = total_duration(&dsl);
        if total > MAX_TOTAL_DURATION_SECS {
            return Err(GeneratorError::DurationExceeded {
                total,
                max: MAX_TOTAL_DURATION_SECS,
            });
        }

        normalize_fps(&mut dsl);
        Ok(GeneratedSpecification {
            dsl,
            total_duration: total,
        })
    }
}
