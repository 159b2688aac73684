//! Heuristic progress extraction from sanitized worker output.

use std::sync::LazyLock;

use regex::Regex;

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})%").expect("valid regex"));

static RATIO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").expect("valid regex"));

/// Most recent progress estimate in `lines`, as a percentage.
///
/// Lines are scanned newest first. In each line a `N%` token is tried
/// first, then a `current/total` counter; the first acceptable value wins.
/// `None` means no progress is known, which is distinct from `Some(0)`.
pub fn extract_progress<S: AsRef<str>>(lines: &[S]) -> Option<u8> {
    lines
        .iter()
        .rev()
        .find_map(|line| percent_token(line.as_ref()).or_else(|| ratio_token(line.as_ref())))
}

fn percent_token(line: &str) -> Option<u8> {
    let caps = PERCENT_RE.captures(line)?;
    let value: u16 = caps[1].parse().ok()?;
    u8::try_from(value).ok().filter(|v| *v <= 100)
}

fn ratio_token(line: &str) -> Option<u8> {
    let caps = RATIO_RE.captures(line)?;
    let current: u64 = caps[1].parse().ok()?;
    let total: u64 = caps[2].parse().ok()?;
    if total == 0 || current > total {
        return None;
    }
    let percent = (current as f64 / total as f64 * 100.0).round();
    Some(percent as u8)
}
