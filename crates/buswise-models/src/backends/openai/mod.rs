//! OpenAI-compatible chat completions backend.

mod backend;

pub use backend::OpenAIBackend;
