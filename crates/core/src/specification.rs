//! Structural checks and helpers for animation specification documents.
//!
//! Submission only enforces the shape the worker cannot run without: a
//! non-empty `title` and a non-empty `scenes` array. Full schema validation
//! of generated documents lives in the generator crate.

use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest total scene duration (seconds) accepted from the generator.
pub const MAX_TOTAL_DURATION_SECS: f64 = 180.0;

/// Frame-rate bounds and default applied to generated documents.
pub const MIN_FPS: i64 = 15;
pub const MAX_FPS: i64 = 60;
pub const DEFAULT_FPS: i64 = 30;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the two submission-layer invariants of a specification.
pub fn validate_specification(spec: &Value) -> Result<(), CoreError> {
    let obj = spec.as_object().ok_or_else(|| {
        CoreError::InvalidSpecification("specification must be a JSON object".into())
    })?;

    match obj.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => {}
        _ => {
            return Err(CoreError::InvalidSpecification(
                "need a non-empty string 'title'".into(),
            ))
        }
    }

    match obj.get("scenes") {
        Some(Value::Array(scenes)) if !scenes.is_empty() => Ok(()),
        Some(Value::Array(_)) => Err(CoreError::InvalidSpecification(
            "'scenes' must contain at least one scene".into(),
        )),
        _ => Err(CoreError::InvalidSpecification(
            "need a 'scenes' array".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sum of top-level scene durations. Missing or non-numeric durations
/// count as zero.
pub fn total_duration(spec: &Value) -> f64 {
    spec.get("scenes")
        .and_then(Value::as_array)
        .map(|scenes| {
            scenes
                .iter()
                .filter_map(|scene| scene.get("duration").and_then(Value::as_f64))
                .sum()
        })
        .unwrap_or(0.0)
}

/// Clamp `fps` into `[MIN_FPS, MAX_FPS]`, or set [`DEFAULT_FPS`] when it is
/// absent or not a number.
pub fn normalize_fps(spec: &mut Value) {
    let Some(obj) = spec.as_object_mut() else {
        return;
    };
    let fps = match obj.get("fps").and_then(Value::as_f64) {
        Some(fps) => (fps.round() as i64).clamp(MIN_FPS, MAX_FPS),
        None => DEFAULT_FPS,
    };
    obj.insert("fps".into(), Value::from(fps));
}
