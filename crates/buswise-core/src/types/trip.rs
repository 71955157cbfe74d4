//! Trip request and the finished, display-ready trip plan.

use serde::{Deserialize, Serialize};

/// A natural-language trip request as submitted by a caller.
///
/// Nothing here is validated; see `buswise_planner::contracts` for the
/// boundary checks applied before any model call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    /// Where the trip starts
    pub start: String,
    /// Where the trip ends
    pub destination: String,
    /// Free-text preferences ("avoid transfers", "prefer AC buses")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TripRequest {
    pub fn new(start: impl Into<String>, destination: impl Into<String>) -> Self {
        TripRequest {
            start: start.into(),
            destination: destination.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One leg of a finished itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStep {
    pub instruction: String,
    pub departure_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    /// Best-effort bus identifier pulled out of `instruction`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_number: Option<String>,
}

/// The itinerary handed back to callers and stored in trip history.
///
/// Built once per successful planning call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub summary: String,
    pub total_time: String,
    pub estimated_cost: String,
    /// Deep link into the external map service with transit directions
    pub maps_url: String,
    /// The exact prompt sent to the model
    pub debug_prompt: String,
    pub steps: Vec<TripStep>,
}

impl TripPlan {
    /// Bus identifiers mentioned across the itinerary, in travel order.
    pub fn bus_numbers(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|s| s.bus_number.as_deref())
    }
}
