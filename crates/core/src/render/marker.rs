//! The synthetic line that terminates every render log.
//!
//! The marker is the only durable record that the worker has stopped; the
//! status service never asks the OS whether a process is alive.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static EXITED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Process exited with code (-?\d+|null)$").expect("valid regex")
});

static TIMED_OUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Process timed out after (\d+) seconds$").expect("valid regex")
});

const CANCELLED_LINE: &str = "Process cancelled";
const SPAWN_FAILED_PREFIX: &str = "Process failed to start: ";

/// How a worker run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitMarker {
    /// The worker exited on its own with this code.
    Exited(i32),
    /// The worker was terminated by a signal and reported no code.
    Signalled,
    /// The deadline expired and the worker was killed.
    TimedOut { secs: u64 },
    /// Server shutdown cancelled the job and the worker was killed.
    Cancelled,
    /// The worker process could not be started.
    SpawnFailed(String),
}

impl ExitMarker {
    /// Exit code, when the worker reported one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Parse a single (already trimmed) log line.
    pub fn parse_line(line: &str) -> Option<Self> {
        if let Some(caps) = EXITED_RE.captures(line) {
            return match &caps[1] {
                "null" => Some(Self::Signalled),
                code => code.parse().ok().map(Self::Exited),
            };
        }
        if let Some(caps) = TIMED_OUT_RE.captures(line) {
            return caps[1].parse().ok().map(|secs| Self::TimedOut { secs });
        }
        if line == CANCELLED_LINE {
            return Some(Self::Cancelled);
        }
        line.strip_prefix(SPAWN_FAILED_PREFIX)
            .map(|reason| Self::SpawnFailed(reason.to_string()))
    }

    /// Marker terminating `lines`, if the last non-blank line is one.
    pub fn find_in<S: AsRef<str>>(lines: &[S]) -> Option<Self> {
        lines
            .last()
            .and_then(|line| Self::parse_line(line.as_ref().trim()))
    }

    /// Bytes appended to the log: the marker on a line of its own.
    pub fn to_log_line(&self) -> String {
        format!("\n{self}\n")
    }
}

impl fmt::Display for ExitMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "Process exited with code {code}"),
            Self::Signalled => f.write_str("Process exited with code null"),
            Self::TimedOut { secs } => write!(f, "Process timed out after {secs} seconds"),
            Self::Cancelled => f.write_str(CANCELLED_LINE),
            Self::SpawnFailed(reason) => {
                // Keep the marker on one line.
                let reason = reason.replace(['\r', '\n'], " ");
                write!(f, "{SPAWN_FAILED_PREFIX}{reason}")
            }
        }
    }
}
