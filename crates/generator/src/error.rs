/// Errors from turning free text into a specification document.
///
/// Input errors are the caller's fault; every other variant is an upstream
/// generation failure and never reaches the render pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Input too long (limit {limit} chars)")]
    InputTooLong { limit: usize },

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The completion endpoint returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse JSON from model output")]
    Unparseable { raw: String },

    /// The model answered with an explicit `{"error": ...}` payload.
    #[error("Model declined the request: {0}")]
    Declined(String),

    #[error("Schema validation failed: {}", details.join("; "))]
    SchemaViolation { details: Vec<String> },

    #[error("Generated DSL too long (total duration {total}s > {max}s)")]
    DurationExceeded { total: f64, max: f64 },

    #[error("Invalid DSL schema: {0}")]
    SchemaCompile(String),
}

impl GeneratorError {
    /// Whether the caller can fix this by changing the input text.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InputTooLong { .. })
    }
}
