//! Google Gemini backend.

mod backend;

pub use backend::GoogleBackend;
