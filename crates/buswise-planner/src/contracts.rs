//! Boundary contracts: what the planner accepts and what the model must
//! produce.
//!
//! Inbound requests are checked before any model call is made. Outbound
//! model text is repaired, validated against the planner output schema and
//! only then deserialized, since nothing guarantees the model honours the
//! shape it was asked for.

use buswise_core::{PlannerError, PlannerOutput, PlannerResult, TripRequest};
use buswise_models::{JsonSchema, OutputParser};
use once_cell::sync::Lazy;
use serde_json::{Value, json};

/// Default minimum length of `start` and `destination`, in characters.
pub const MIN_LOCATION_CHARS: usize = 3;

static OUTPUT_SCHEMA: Lazy<JsonSchema> = Lazy::new(|| {
    JsonSchema::from_value(output_schema(true)).expect("planner output schema is valid")
});

/// A request that passed boundary validation.
///
/// Only [`validate_request`] constructs one, so holding a value is proof
/// that both locations met the minimum length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTripRequest {
    start: String,
    destination: String,
    notes: Option<String>,
}

impl ValidatedTripRequest {
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Check `start` and `destination` independently against `min_chars`.
///
/// Lengths are counted in characters, not bytes, and input is not trimmed.
pub fn validate_request(
    request: &TripRequest,
    min_chars: usize,
) -> PlannerResult<ValidatedTripRequest> {
    check_location("start", &request.start, min_chars)?;
    check_location("destination", &request.destination, min_chars)?;

    Ok(ValidatedTripRequest {
        start: request.start.clone(),
        destination: request.destination.clone(),
        notes: request.notes.clone(),
    })
}

fn check_location(field: &'static str, value: &str, min_chars: usize) -> PlannerResult<()> {
    if value.chars().count() < min_chars {
        return Err(PlannerError::validation(
            field,
            format!("must be at least {min_chars} characters"),
        ));
    }
    Ok(())
}

/// JSON Schema of the planner output.
///
/// With `nullable_optionals` the optional step fields also accept `null`,
/// which is what the local validator uses. Providers get the strict form.
pub fn output_schema(nullable_optionals: bool) -> Value {
    let optional = if nullable_optionals {
        json!({"type": ["string", "null"]})
    } else {
        json!({"type": "string"})
    };

    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "A brief, one or two-sentence summary of the overall trip."
            },
            "steps": {
                "type": "array",
                "description": "Step-by-step instructions from start to destination.",
                "items": {
                    "type": "object",
                    "properties": {
                        "instruction": {"type": "string"},
                        "schedule": {"type": "string"},
                        "arrivalTime": optional.clone(),
                        "locationName": {"type": "string"},
                        "description": {"type": "string"},
                        "landmark": optional
                    },
                    "required": ["instruction", "schedule", "locationName", "description"]
                }
            },
            "eta": {"type": "string"},
            "estimatedCost": {"type": "string"}
        },
        "required": ["summary", "steps", "eta", "estimatedCost"]
    })
}

/// Schema forwarded to the model provider as a structured-output constraint.
pub fn provider_schema() -> Value {
    output_schema(false)
}

/// Recover, validate and deserialize planner output from raw model text.
pub fn parse_planner_output(text: &str) -> PlannerResult<PlannerOutput> {
    OutputParser::parse_as(text, &OUTPUT_SCHEMA).map_err(|e| PlannerError::malformed(format!("{e:#}")))
}
