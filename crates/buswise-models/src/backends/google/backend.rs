//! Google AI backend implementation for the Gemini `generateContent` API.

use crate::backends::{LLMBackend, LLMRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use buswise_core::{FinishReason, LLMResponse, TokenUsage, log_debug, log_error};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Google AI LLM backend.
pub struct GoogleBackend {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleBackend {
    /// Create a new Google backend. `config` may carry `model` and `base_url`.
    pub async fn new(api_key: &str, config: Option<serde_json::Value>) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("Google backend requires an API key");
        }

        let model = config
            .as_ref()
            .and_then(|c| c.get("model"))
            .and_then(|m| m.as_str())
            .unwrap_or(DEFAULT_MODEL)
            .to_string();

        let base_url = config
            .as_ref()
            .and_then(|c| c.get("base_url"))
            .and_then(|u| u.as_str())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(GoogleBackend {
            api_key: api_key.to_string(),
            model,
            base_url,
            client: reqwest::Client::new(),
        })
    }

    fn build_request_body(&self, request: &LLMRequest) -> serde_json::Value {
        let mut generation_config = json!({
            "temperature": request.temperature,
            "maxOutputTokens": request.max_tokens.unwrap_or(2048),
            "topP": 0.95,
        });

        if let Some(schema) = &request.response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseJsonSchema"] = schema.clone();
        }

        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }],
            "generationConfig": generation_config,
        })
    }

    fn parse_response(&self, response: GoogleResponse) -> Result<LLMResponse> {
        let candidate = response
            .candidates
            .first()
            .context("No candidates in Google response")?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!(
                "Google response contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
        }

        let finish_reason = candidate
            .finish_reason
            .as_deref()
            .map(FinishReason::from_string)
            .unwrap_or(FinishReason::Unknown);

        let usage = response
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(LLMResponse::new(text, &self.model, usage, finish_reason))
    }
}

#[async_trait]
impl LLMBackend for GoogleBackend {
    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse> {
        request.validate()?;

        let body = self.build_request_body(&request);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        log_debug!(
            "models::google",
            model = %self.model,
            "Sending request to Google AI"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Google")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log_error!(
                "models::google",
                status = %status,
                model = %self.model,
                "Google API request failed"
            );
            anyhow::bail!("Google API error (status {}): {}", status, error_text);
        }

        let api_response: GoogleResponse = response
            .json()
            .await
            .context("Failed to parse Google response")?;

        self.parse_response(api_response)
    }

    fn name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Google API response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}
