//! The tagged result handed to callers of the planner.

use buswise_core::TripPlan;
use serde::{Deserialize, Serialize};

/// Tagged outcome of a planning call: `{success: true, data}` or
/// `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTripResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TripPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlanTripResult {
    pub fn ok(plan: TripPlan) -> Self {
        PlanTripResult {
            success: true,
            data: Some(plan),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        PlanTripResult {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<TripPlan, String> {
        match (self.success, self.data) {
            (true, Some(plan)) => Ok(plan),
            _ => Err(self.error.unwrap_or_else(|| "unknown planner failure".to_string())),
        }
    }
}
