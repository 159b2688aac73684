//! Job identifiers and the fixed file names inside a job workspace.

use std::fmt;

use rand::Rng;

use crate::error::CoreError;

/// Number of random bytes in a freshly generated job id (128 bits).
pub const JOB_ID_BYTES: usize = 16;

/// Longest id accepted from a caller.
pub const MAX_JOB_ID_LEN: usize = 128;

/// Input specification written into every workspace.
pub const SPEC_FILE_NAME: &str = "dsl.json";

/// Worker-owned artifact directory.
pub const OUTPUT_DIR_NAME: &str = "output";

/// Supervisor-owned append-only log.
pub const LOG_FILE_NAME: &str = "render.log";

/// Opaque job handle, safe to embed in a path segment and a query string.
///
/// The id doubles as an access credential: anyone holding it may read the
/// job's status and artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Mint a new random id rendered as lowercase hex.
    pub fn generate() -> Self {
        let mut bytes = [0u8; JOB_ID_BYTES];
        rand::rng().fill(&mut bytes);
        let hex = bytes.iter().map(|b| format!("{b:02x}")).collect::<String>();
        Self(hex)
    }

    /// Validate an id received from a caller.
    ///
    /// Traversal tokens and path separators are reported as
    /// [`CoreError::PathTraversal`] so the security rejection stays distinct
    /// from an ordinary malformed id.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.is_empty() {
            return Err(CoreError::InvalidJobId("jobId required".into()));
        }
        if raw.contains("..") || raw.contains('/') || raw.contains('\\') {
            return Err(CoreError::PathTraversal(format!("invalid job id '{raw}'")));
        }
        if raw.len() > MAX_JOB_ID_LEN {
            return Err(CoreError::InvalidJobId(format!(
                "job id longer than {MAX_JOB_ID_LEN} characters"
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidJobId(format!(
                "job id '{raw}' contains unsupported characters"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relative URL a client polls for this job's status.
pub fn status_url(id: &JobId) -> String {
    format!("/api/job-status?jobId={id}")
}
