//! `buswise plan`

mod args;
mod driver;
mod output;

pub use args::PlanArgs;
pub use driver::execute;
