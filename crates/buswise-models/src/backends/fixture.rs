//! Deterministic replay backend.
//!
//! Replies are served from a script, in order. Used by tests and by offline
//! demos; it also records when and with what prompt it was called.

use crate::backends::{LLMBackend, LLMRequest};
use async_trait::async_trait;
use buswise_core::{FinishReason, LLMResponse, TokenUsage};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// One scripted outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureReply {
    /// Successful generation with this text
    Text(String),
    /// Failed call with this error message
    Error(String),
}

#[derive(Default)]
struct Recorded {
    instants: Vec<Instant>,
    prompts: Vec<String>,
}

/// Backend that replays scripted replies.
pub struct FixtureBackend {
    model: String,
    script: Mutex<VecDeque<FixtureReply>>,
    fallback: Option<FixtureReply>,
    latency: Option<Duration>,
    recorded: Mutex<Recorded>,
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureBackend {
    pub fn new() -> Self {
        FixtureBackend {
            model: "fixture".to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            latency: None,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(FixtureReply::Text(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(FixtureReply::Error(message.into()));
        self
    }

    /// Outcome served once the script runs dry.
    pub fn otherwise(mut self, reply: FixtureReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Sleep this long (on the tokio clock) before every reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn call_count(&self) -> usize {
        self.recorded.lock().instants.len()
    }

    /// When each call arrived, on the tokio clock.
    pub fn call_instants(&self) -> Vec<Instant> {
        self.recorded.lock().instants.clone()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.recorded.lock().prompts.clone()
    }
}

#[async_trait]
impl LLMBackend for FixtureBackend {
    async fn generate(&self, request: LLMRequest) -> anyhow::Result<LLMResponse> {
        {
            let mut recorded = self.recorded.lock();
            recorded.instants.push(Instant::now());
            recorded.prompts.push(request.prompt.clone());
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.script.lock().pop_front().or_else(|| self.fallback.clone());
        match next {
            Some(FixtureReply::Text(text)) => Ok(LLMResponse::new(
                text,
                &self.model,
                TokenUsage::default(),
                FinishReason::Stop,
            )),
            Some(FixtureReply::Error(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("fixture backend has no scripted reply left")),
        }
    }

    fn name(&self) -> &str {
        "fixture"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_fallback() {
        let backend = FixtureBackend::new()
            .fail("429")
            .reply("{}")
            .otherwise(FixtureReply::Error("offline".into()));

        assert!(backend.generate(LLMRequest::new("a")).await.is_err());
        assert_eq!(backend.generate(LLMRequest::new("b")).await.unwrap().content, "{}");
        let err = backend.generate(LLMRequest::new("c")).await.unwrap_err();
        assert_eq!(err.to_string(), "offline");

        assert_eq!(backend.call_count(), 3);
        assert_eq!(backend.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_the_reply() {
        let backend = FixtureBackend::new()
            .reply("{}")
            .with_latency(Duration::from_secs(3));

        let started = Instant::now();
        backend.generate(LLMRequest::new("a")).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert_eq!(backend.call_instants(), vec![started]);
    }

    #[tokio::test]
    async fn empty_script_is_an_error() {
        let backend = FixtureBackend::new();
        assert!(backend.generate(LLMRequest::new("a")).await.is_err());
    }
}
