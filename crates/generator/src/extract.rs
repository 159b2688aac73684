//! Recover a JSON object from free-form model output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("valid regex"));

/// First balanced top-level `{...}` in `text`, parsed as JSON.
///
/// Braces inside string literals are ignored. If the candidate does not
/// parse, one retry is made with trailing commas removed.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return parse_candidate(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_candidate(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate).ok().or_else(|| {
        let cleaned = TRAILING_COMMA_RE.replace_all(candidate, "$1");
        serde_json::from_str(&cleaned).ok()
    })
}
