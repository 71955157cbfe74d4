//! `buswise prompt`

mod args;
mod driver;

pub use args::PromptArgs;
pub use driver::execute;
