//! Provider-neutral model response types.

use serde::{Deserialize, Serialize};

/// Text returned by a model backend together with bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    /// The generated text
    pub content: String,
    /// Model that produced it
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: FinishReason,
}

impl LLMResponse {
    pub fn new(
        content: impl Into<String>,
        model: impl Into<String>,
        usage: TokenUsage,
        finish_reason: FinishReason,
    ) -> Self {
        LLMResponse {
            content: content.into(),
            model: model.into(),
            usage,
            finish_reason,
        }
    }

    /// True when generation ended on its own rather than being cut off.
    pub fn completed_normally(&self) -> bool {
        matches!(self.finish_reason, FinishReason::Stop)
    }
}

/// Token accounting for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

impl TokenUsage {
    pub fn new(input: usize, output: usize) -> Self {
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
            total_tokens: input + output,
        }
    }
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Unknown,
}

impl FinishReason {
    /// Parse the provider-specific spelling (`STOP`, `MAX_TOKENS`, `length`, ...).
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "stop" | "end_turn" => FinishReason::Stop,
            "length" | "max_tokens" => FinishReason::Length,
            "content_filter" | "safety" | "recitation" => FinishReason::ContentFilter,
            _ => FinishReason::Unknown,
        }
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::Length => write!(f, "length"),
            FinishReason::ContentFilter => write!(f, "content_filter"),
            FinishReason::Unknown => write!(f, "unknown"),
        }
    }
}
