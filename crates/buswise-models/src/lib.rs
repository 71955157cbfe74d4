//! buswise models - the resilient invocation layer.
//!
//! Provides the `LLMBackend` seam with Google Gemini and OpenAI
//! implementations, rate-limit aware retry with exponential backoff, and
//! schema validation of structured model output.

pub mod backends;
pub mod retry;
pub mod schema;

pub use backends::{
    BackendFactory, FixtureBackend, FixtureReply, GoogleBackend, LLMBackend, LLMRequest,
    OpenAIBackend,
};
pub use retry::{Cancelled, ErrorClass, RetryConfig, RetryStrategy, classify_error, is_rate_limit_message};
pub use schema::{JsonSchema, OutputParser};
