//! Planner prompt construction.

use crate::contracts::ValidatedTripRequest;
use buswise_core::{PlannerError, PlannerResult};
use buswise_prompts::{TRIP_PLANNER, render_prompt};
use serde::Serialize;

/// Values injected into the trip planner template.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext<'a> {
    pub start_location: &'a str,
    pub destination: &'a str,
    /// Empty when the caller gave no preferences
    pub notes: &'a str,
}

impl<'a> From<&'a ValidatedTripRequest> for PromptContext<'a> {
    fn from(request: &'a ValidatedTripRequest) -> Self {
        PromptContext {
            start_location: request.start(),
            destination: request.destination(),
            notes: request.notes().unwrap_or_default(),
        }
    }
}

/// Render the instruction sent to the model. The result doubles as the
/// plan's `debug_prompt`.
pub fn build_prompt(request: &ValidatedTripRequest) -> PlannerResult<String> {
    render_prompt(TRIP_PLANNER, &PromptContext::from(request)).map_err(|e| PlannerError::Prompt {
        message: e.to_string(),
    })
}
