//! Structured output the generative model is asked to produce.

use serde::{Deserialize, Serialize};

/// Raw planner output, after schema validation but before any derivation.
///
/// Time and cost fields are opaque display strings; the model is told to
/// include AM/PM markers but nothing here parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerOutput {
    pub summary: String,
    pub steps: Vec<PlannerStep>,
    pub eta: String,
    pub estimated_cost: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerStep {
    /// Main action, e.g. "Take Bus 502"
    pub instruction: String,
    /// Departure or start time
    pub schedule: String,
    #[serde(default)]
    pub arrival_time: Option<String>,
    /// Transit point or stop name
    pub location_name: String,
    pub description: String,
    #[serde(default)]
    pub landmark: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_accept_null_and_absence() {
        let output: PlannerOutput = serde_json::from_value(json!({
            "summary": "s",
            "steps": [
                {
                    "instruction": "Walk to the stop",
                    "schedule": "8:00 AM",
                    "locationName": "Home",
                    "description": "Five minute walk",
                    "landmark": null
                }
            ],
            "eta": "30 minutes",
            "estimatedCost": "₹20",
            "confidence": "high"
        }))
        .unwrap();

        assert_eq!(output.steps.len(), 1);
        assert_eq!(output.steps[0].arrival_time, None);
        assert_eq!(output.steps[0].landmark, None);
        assert_eq!(output.estimated_cost, "₹20");
    }
}
