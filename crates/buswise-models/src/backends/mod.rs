//! Model backends.
//!
//! - `LLMBackend`: the trait every provider implements
//! - `LLMRequest`: provider-neutral request
//! - Providers: Google Gemini, OpenAI, and a scripted fixture backend
//! - `BackendFactory`: build a backend from a provider name

pub mod fixture;
pub mod google;
pub mod openai;
pub mod request;
pub mod traits;

pub use fixture::{FixtureBackend, FixtureReply};
pub use google::GoogleBackend;
pub use openai::OpenAIBackend;
pub use request::LLMRequest;
pub use traits::LLMBackend;

use std::sync::Arc;

/// Factory for creating LLM backends from provider configuration.
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend from a provider name and API key. `config` may carry
    /// `model` and `base_url`.
    pub async fn create(
        provider: &str,
        api_key: &str,
        config: Option<serde_json::Value>,
    ) -> anyhow::Result<Arc<dyn LLMBackend>> {
        match provider.to_lowercase().as_str() {
            "google" | "gemini" => Ok(Arc::new(GoogleBackend::new(api_key, config).await?)),
            "openai" => Ok(Arc::new(OpenAIBackend::new(api_key, config).await?)),
            _ => Err(anyhow::anyhow!(
                "Unknown provider: {}. Supported: {}",
                provider,
                Self::list_providers().join(", ")
            )),
        }
    }

    /// Providers `create` understands.
    pub fn list_providers() -> Vec<&'static str> {
        vec!["google", "openai"]
    }
}
