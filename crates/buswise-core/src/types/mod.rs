//! Shared data types.

pub mod model;
pub mod planner_output;
pub mod trip;

pub use model::{FinishReason, LLMResponse, TokenUsage};
pub use planner_output::{PlannerOutput, PlannerStep};
pub use trip::{TripPlan, TripRequest, TripStep};
