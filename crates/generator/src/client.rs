//! REST client for an OpenAI-compatible chat completions endpoint.

use serde::Deserialize;
use serde_json::json;

use crate::error::GeneratorError;

/// Completion tokens requested per generation.
pub const MAX_COMPLETION_TOKENS: u32 = 1500;

/// HTTP client for a single chat completions API.
pub struct ChatClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    /// * `api_url` - Base URL, e.g. `https://api.openai.com/v1`.
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key, model)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        api_key: String,
        model: String,
    ) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one deterministic (temperature 0) completion request and
    /// return the text of the first choice, or an empty string if the
    /// reply has none.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, GeneratorError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": 0.0,
            "max_tokens": MAX_COMPLETION_TOKENS,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed: ChatResponse = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    /// Turn a non-2xx response into [`GeneratorError::Api`] carrying the
    /// status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GeneratorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
