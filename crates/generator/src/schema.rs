//! JSON schema of the animation DSL emitted by the generator.

use std::sync::LazyLock;

use serde_json::{json, Value};

use crate::error::GeneratorError;

/// Maximum number of schema errors reported back to the caller.
const MAX_REPORTED_ERRORS: usize = 10;

/// Scene kinds the renderer understands.
pub const SCENE_TYPES: &[&str] = &[
    "text_slide",
    "array_display",
    "highlight",
    "swap",
    "draw_graph",
    "plot_function",
    "equation",
    "camera_move",
    "show_image",
    "voiceover_segment",
    "parallel",
    "transition",
    "final_text",
];

static DSL_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Manim Animation DSL",
        "type": "object",
        "required": ["title", "scenes"],
        "additionalProperties": false,
        "properties": {
            "title": { "type": "string" },
            "width": { "type": "integer", "minimum": 320, "maximum": 3840, "default": 1280 },
            "height": { "type": "integer", "minimum": 240, "maximum": 2160, "default": 720 },
            "fps": { "type": "integer", "minimum": 15, "maximum": 60, "default": 30 },
            "voiceover": { "type": "string" },
            "scenes": {
                "type": "array",
                "minItems": 1,
                "items": { "$ref": "#/definitions/scene" }
            }
        },
        "definitions": {
            "scene": {
                "type": "object",
                "required": ["type", "duration"],
                "additionalProperties": false,
                "properties": {
                    "type": { "type": "string", "enum": SCENE_TYPES },
                    "duration": { "type": "number", "minimum": 0.1 },
                    "delay": { "type": "number", "minimum": 0, "default": 0 },
                    "mode": { "type": "string", "enum": ["sequence", "parallel"], "default": "sequence" },
                    "id": { "type": "string" },
                    "meta": { "type": "object" },
                    "easing": {
                        "type": "string",
                        "enum": ["linear", "ease_in", "ease_out", "ease_in_out", "smooth"]
                    },
                    "text": { "type": "string" },
                    "values": { "type": "array", "items": { "type": "number" } },
                    "layout": {
                        "type": "object",
                        "properties": {
                            "orientation": { "type": "string", "enum": ["horizontal", "vertical"] },
                            "x_gap": { "type": "number" },
                            "y_gap": { "type": "number" }
                        },
                        "additionalProperties": true
                    },
                    "position": {
                        "type": "object",
                        "properties": { "x": { "type": "number" }, "y": { "type": "number" } }
                    },
                    "style": {
                        "type": "object",
                        "properties": {
                            "color": { "type": "string" },
                            "font_size": { "type": "number" },
                            "weight": { "type": "string" }
                        }
                    },
                    "target": {
                        "type": "object",
                        "properties": {
                            "array_index": { "type": "integer", "minimum": 0 },
                            "element_id": { "type": "string" }
                        }
                    },
                    "i": { "type": "integer", "minimum": 0 },
                    "j": { "type": "integer", "minimum": 0 },
                    "graph": { "type": "object" },
                    "function": { "type": "string" },
                    "image": { "type": "string" },
                    "audio": { "type": "string" },
                    "camera": {
                        "type": "object",
                        "properties": {
                            "zoom": { "type": "number" },
                            "pan": {
                                "type": "object",
                                "properties": { "x": { "type": "number" }, "y": { "type": "number" } }
                            }
                        }
                    },
                    "children": { "type": "array", "items": { "$ref": "#/definitions/scene" } }
                }
            }
        }
    })
});

/// The DSL schema document, embedded in prompts and used for validation.
pub fn dsl_schema() -> &'static Value {
    &DSL_SCHEMA
}

/// Compiled DSL schema.
pub struct DslValidator {
    inner: jsonschema::Validator,
}

impl DslValidator {
    pub fn new() -> Result<Self, GeneratorError> {
        let inner = jsonschema::Validator::new(dsl_schema())
            .map_err(|e| GeneratorError::SchemaCompile(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Validate `dsl`, returning up to ten error descriptions on failure.
    pub fn validate(&self, dsl: &Value) -> Result<(), Vec<String>> {
        let details: Vec<String> = self
            .inner
            .iter_errors(dsl)
            .take(MAX_REPORTED_ERRORS)
            .map(|e| e.to_string())
            .collect();
        if details.is_empty() {
            Ok(())
        } else {
            Err(details)
        }
    }
}
