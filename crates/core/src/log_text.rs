//! Render log cleanup.
//!
//! Worker tools draw progress bars with ANSI colour codes and carriage
//! returns. [`sanitize_log`] turns that into plain text where every
//! overwritten progress update survives as its own line.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// CSI sequence: `ESC [`, parameter bytes, intermediate bytes, final byte.
static CSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").expect("valid regex"));

static CARRIAGE_RETURNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r+").expect("valid regex"));

/// Strip terminal escape sequences and turn carriage returns into newlines.
///
/// Escape characters left over after CSI removal are dropped as well, so
/// the output never contains ESC or CR and a second pass is a no-op.
pub fn sanitize_log(raw: &str) -> String {
    let stripped = CSI_RE.replace_all(raw, "");
    let stripped: Cow<'_, str> = if stripped.contains('\x1b') {
        Cow::Owned(stripped.replace('\x1b', ""))
    } else {
        stripped
    };
    CARRIAGE_RETURNS_RE.replace_all(&stripped, "\n").into_owned()
}

/// Lines that contain something other than whitespace.
pub fn non_blank_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// The last `count` lines of `lines`, joined with `\n`.
pub fn tail(lines: &[&str], count: usize) -> String {
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
