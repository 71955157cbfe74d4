//! Structural validation of model output.
//!
//! Models are told to answer with bare JSON but regularly wrap it in code
//! fences or chatter. [`OutputParser`] recovers the JSON value, and
//! [`JsonSchema`] checks it before anything is deserialized.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json|JSON)?\s*\n?([\s\S]*?)\n?```").expect("fenced block regex is valid")
});

static EMBEDDED_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("embedded object regex is valid"));

/// Compiled JSON Schema.
pub struct JsonSchema {
    schema: Value,
    validator: jsonschema::JSONSchema,
}

impl JsonSchema {
    pub fn from_value(schema: Value) -> Result<Self> {
        let validator = jsonschema::JSONSchema::compile(&schema)
            .map_err(|e| anyhow::anyhow!("Invalid JSON schema: {}", e))?;

        Ok(JsonSchema { schema, validator })
    }

    /// Validate a value, collecting every violation into one error.
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.validator.validate(value).map_err(|errors| {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();

            anyhow::anyhow!("Schema validation failed: {}", messages.join("; "))
        })
    }
}

impl std::fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchema").field("schema", &self.schema).finish()
    }
}

/// Extracts JSON from free-form model text.
pub struct OutputParser;

impl OutputParser {
    /// Parse JSON from text: direct parse, then a fenced block, then the
    /// outermost `{...}` span.
    pub fn parse_json(text: &str) -> Result<Value> {
        let trimmed = text.trim();
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Ok(value);
        }

        if let Ok(value) = Self::extract_from_markdown(trimmed) {
            return Ok(value);
        }

        if let Some(found) = EMBEDDED_OBJECT.find(trimmed) {
            if let Ok(value) = serde_json::from_str::<Value>(found.as_str()) {
                return Ok(value);
            }
        }

        Err(anyhow::anyhow!(
            "No valid JSON found in model output ({} chars)",
            text.len()
        ))
    }

    fn extract_from_markdown(text: &str) -> Result<Value> {
        let captures = FENCED_BLOCK
            .captures(text)
            .context("No markdown code block found")?;
        let body = captures
            .get(1)
            .context("No content in code block")?
            .as_str()
            .trim();
        serde_json::from_str(body).context("Failed to parse JSON from markdown block")
    }

    /// Parse, validate, and deserialize in one go.
    pub fn parse_as<T: DeserializeOwned>(text: &str, schema: &JsonSchema) -> Result<T> {
        let value = Self::parse_json(text)?;
        schema.validate(&value)?;
        serde_json::from_value(value).context("Validated output did not match the target type")
    }
}
