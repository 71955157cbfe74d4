//! CLI commands.

pub mod plan;
pub mod prompt;

mod trip;

pub use plan::PlanArgs;
pub use prompt::PromptArgs;
pub use trip::TripArgs;
