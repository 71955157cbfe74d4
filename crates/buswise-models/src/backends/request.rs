//! Provider-neutral request type.

/// One generation request.
#[derive(Debug, Clone)]
pub struct LLMRequest {
    /// The main prompt text
    pub prompt: String,
    /// Randomness, 0.0-2.0
    pub temperature: f64,
    pub max_tokens: Option<usize>,
    /// JSON Schema the answer must satisfy; backends forward it as a
    /// structured-output constraint when the provider supports one.
    pub response_schema: Option<serde_json::Value>,
}

impl LLMRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        LLMRequest {
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: None,
            response_schema: None,
        }
    }

    /// Set temperature, clamped to 0.0-2.0.
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_response_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Reject requests no provider would accept.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.prompt.trim().is_empty() {
            anyhow::bail!("Prompt cannot be empty");
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            );
        }

        Ok(())
    }
}
