//! buswise core - domain types, the planner error taxonomy and logging
//! macros shared by every buswise crate.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{PlannerError, PlannerResult};
pub use types::{
    FinishReason, LLMResponse, PlannerOutput, PlannerStep, TokenUsage, TripPlan, TripRequest,
    TripStep,
};
