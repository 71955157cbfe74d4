//! The seam between the planner and any generative model.

use super::LLMRequest;
use async_trait::async_trait;
use buswise_core::LLMResponse;

/// A generative model reachable over some transport.
///
/// Errors carry the provider's own wording (including HTTP status codes) so
/// that rate-limit classification can inspect them.
#[async_trait]
pub trait LLMBackend: Send + Sync {
    /// Run one generation request.
    async fn generate(&self, request: LLMRequest) -> anyhow::Result<LLMResponse>;

    /// Provider name (`google`, `openai`, ...).
    fn name(&self) -> &str;

    /// Configured model identifier.
    fn model(&self) -> &str;
}
