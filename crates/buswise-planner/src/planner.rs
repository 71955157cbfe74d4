//! The `plan_trip` entry point.
//!
//! [`TripPlanner`] ties the pipeline together: validate, render the prompt,
//! call the model through the retry layer, parse and transform. Every path
//! ends in a [`PlanTripResult`]; errors never escape to the caller.

use crate::contracts::{self, MIN_LOCATION_CHARS};
use crate::prompt;
use crate::result::PlanTripResult;
use crate::transform::{self, MapsLinkBuilder};
use anyhow::Context;
use buswise_config::{BuswiseConfig, RetryPolicyConfig};
use buswise_core::{
    LLMResponse, PlannerError, PlannerOutput, PlannerResult, TripPlan, TripRequest, log_debug,
    log_error, log_info, log_trace, log_warn,
};
use buswise_models::{
    BackendFactory, Cancelled, ErrorClass, LLMBackend, LLMRequest, RetryConfig, RetryStrategy,
    classify_error,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Tunables of one planner instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    pub min_location_chars: usize,
    pub temperature: f64,
    pub max_output_tokens: Option<usize>,
    /// Bound on each model call; backoff between attempts is not counted
    pub request_timeout: Option<Duration>,
    pub maps_base_url: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        PlannerSettings {
            min_location_chars: MIN_LOCATION_CHARS,
            temperature: 0.4,
            max_output_tokens: None,
            request_timeout: None,
            maps_base_url: transform::DEFAULT_MAPS_BASE_URL.to_string(),
        }
    }
}

impl From<&BuswiseConfig> for PlannerSettings {
    fn from(config: &BuswiseConfig) -> Self {
        PlannerSettings {
            min_location_chars: config.planner.min_location_chars,
            temperature: config.llm.temperature,
            max_output_tokens: config.llm.max_output_tokens,
            request_timeout: Some(config.planner.request_timeout_secs)
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
            maps_base_url: config.planner.maps_base_url.clone(),
        }
    }
}

/// Retry policy as configured on disk.
pub fn retry_config(policy: &RetryPolicyConfig) -> RetryConfig {
    RetryConfig::new(
        policy.max_attempts,
        Duration::from_millis(policy.initial_delay_ms),
        Duration::from_millis(policy.max_delay_ms),
        policy.backoff_multiplier,
    )
    .with_jitter(policy.jitter)
}

/// Plans trips against one model backend.
///
/// Holds no per-request state; one instance serves concurrent callers.
#[derive(Clone)]
pub struct TripPlanner {
    backend: Arc<dyn LLMBackend>,
    retry: RetryStrategy,
    settings: PlannerSettings,
    maps: MapsLinkBuilder,
}

impl std::fmt::Debug for TripPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripPlanner")
            .field("backend", &self.backend.name())
            .field("model", &self.backend.model())
            .field("retry", self.retry.config())
            .field("settings", &self.settings)
            .finish()
    }
}

impl TripPlanner {
    /// Planner with the default retry policy and settings.
    pub fn new(backend: Arc<dyn LLMBackend>) -> Self {
        TripPlanner {
            backend,
            retry: RetryStrategy::default(),
            settings: PlannerSettings::default(),
            maps: MapsLinkBuilder::default(),
        }
    }

    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = RetryStrategy::new(config);
        self
    }

    pub fn with_settings(mut self, settings: PlannerSettings) -> Self {
        self.maps = MapsLinkBuilder::new(settings.maps_base_url.clone());
        self.settings = settings;
        self
    }

    /// Planner over `backend`, tuned by `config`.
    pub fn from_config(backend: Arc<dyn LLMBackend>, config: &BuswiseConfig) -> Self {
        Self::new(backend)
            .with_retry(retry_config(&config.retry))
            .with_settings(PlannerSettings::from(config))
    }

    /// Create the configured backend and wrap it in a planner.
    pub async fn connect(config: &BuswiseConfig) -> anyhow::Result<Self> {
        let api_key = config.resolve_api_key()?;
        let mut options = serde_json::Map::new();
        if let Some(model) = &config.llm.model {
            options.insert("model".to_string(), json!(model));
        }
        if let Some(endpoint) = &config.llm.endpoint {
            options.insert("base_url".to_string(), json!(endpoint));
        }

        let backend = BackendFactory::create(
            &config.llm.provider,
            &api_key,
            Some(serde_json::Value::Object(options)),
        )
        .await
        .with_context(|| format!("Failed to create '{}' backend", config.llm.provider))?;

        log_info!(
            "planner",
            provider = backend.name(),
            model = backend.model(),
            "Trip planner ready"
        );
        Ok(Self::from_config(backend, config))
    }

    /// Plan a trip. Never fails; the outcome is tagged in the result.
    pub async fn plan_trip(&self, request: TripRequest) -> PlanTripResult {
        self.plan_trip_with_cancel(request, None).await
    }

    /// Like [`plan_trip`](Self::plan_trip), abandoning the work (pending
    /// backoff included) once `cancel` fires.
    pub async fn plan_trip_with_cancel(
        &self,
        request: TripRequest,
        cancel: Option<&CancellationToken>,
    ) -> PlanTripResult {
        match self.try_plan(&request, cancel).await {
            Ok(plan) => {
                log_info!(
                    "planner",
                    steps = plan.steps.len(),
                    total_time = %plan.total_time,
                    "Trip planned"
                );
                PlanTripResult::ok(plan)
            }
            Err(err @ PlannerError::Validation { .. }) => {
                log_debug!("planner", error = %err, "Rejected trip request");
                PlanTripResult::failure(err.user_message())
            }
            Err(err) => {
                log_error!(
                    "planner",
                    kind = err.kind(),
                    error = %err,
                    start = %request.start,
                    destination = %request.destination,
                    "Trip planning failed"
                );
                PlanTripResult::failure(err.user_message())
            }
        }
    }

    /// The pipeline with typed errors.
    pub async fn try_plan(
        &self,
        request: &TripRequest,
        cancel: Option<&CancellationToken>,
    ) -> PlannerResult<TripPlan> {
        let validated = contracts::validate_request(request, self.settings.min_location_chars)?;
        let prompt = prompt::build_prompt(&validated)?;
        log_trace!("planner", prompt = %prompt, "Rendered prompt");
        let output = self.invoke(&prompt, cancel).await?;
        transform::to_trip_plan(&validated, &output, &prompt, &self.maps)
    }

    async fn invoke(
        &self,
        prompt: &str,
        cancel: Option<&CancellationToken>,
    ) -> PlannerResult<PlannerOutput> {
        let mut request = LLMRequest::new(prompt)
            .with_temperature(self.settings.temperature)
            .with_response_schema(contracts::provider_schema());
        if let Some(max_tokens) = self.settings.max_output_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let timeout = self.settings.request_timeout;
        let outcome = self
            .retry
            .execute_with_cancel(
                || {
                    let request = request.clone();
                    let backend = &self.backend;
                    async move { generate_within(backend.as_ref(), request, timeout).await }
                },
                cancel,
            )
            .await;

        let response = outcome.map_err(upstream_error)?;
        log_response(&response);
        log_trace!("planner", content = %response.content, "Raw model output");
        contracts::parse_planner_output(&response.content)
    }
}

/// One model call, bounded by `limit`.
async fn generate_within(
    backend: &dyn LLMBackend,
    request: LLMRequest,
    limit: Option<Duration>,
) -> anyhow::Result<LLMResponse> {
    let Some(limit) = limit else {
        return backend.generate(request).await;
    };
    tokio::time::timeout(limit, backend.generate(request))
        .await
        .map_err(|_| anyhow::anyhow!("model request timed out after {}s", limit.as_secs()))?
}

fn log_response(response: &LLMResponse) {
    if response.completed_normally() {
        log_debug!(
            "planner",
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Model answered"
        );
    } else {
        log_warn!(
            "planner",
            model = %response.model,
            finish_reason = %response.finish_reason,
            "Model stopped early; output may be truncated"
        );
    }
}

/// Map an error from the model call onto the planner taxonomy.
fn upstream_error(error: anyhow::Error) -> PlannerError {
    if error.downcast_ref::<Cancelled>().is_some() {
        return PlannerError::Cancelled;
    }

    let message = format!("{error:#}");
    match classify_error(&error) {
        ErrorClass::RateLimited => PlannerError::RateLimited { message },
        ErrorClass::Other => PlannerError::Upstream { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buswise_core::error::{INVALID_INPUT_MESSAGE, RATE_LIMIT_MESSAGE};
    use buswise_models::{FixtureBackend, FixtureReply};
    use tokio::time::Instant;

    const PLAN_JSON: &str = r#"{
        "summary": "Bus 500D along the Outer Ring Road.",
        "steps": [
            {"instruction": "Walk to Silk Board", "schedule": "9:00 AM", "locationName": "Silk Board", "description": "Five minute walk"},
            {"instruction": "Take Bus 500D", "schedule": "9:10 AM", "arrivalTime": "9:50 AM", "locationName": "Marathahalli", "description": "Board at the ORR stop", "landmark": "Flyover"},
            {"instruction": "Walk to the office", "schedule": "9:55 AM", "locationName": "Whitefield", "description": "Short walk"}
        ],
        "eta": "55 minutes",
        "estimatedCost": "₹40.00"
    }"#;

    fn planner(backend: &Arc<FixtureBackend>) -> TripPlanner {
        TripPlanner::new(backend.clone())
    }

    fn request() -> TripRequest {
        TripRequest::new("Silk Board", "Whitefield")
    }

    #[tokio::test]
    async fn plans_a_trip() {
        let backend = Arc::new(FixtureBackend::new().reply(PLAN_JSON));
        let result = planner(&backend).plan_trip(request()).await;

        assert!(result.success, "{:?}", result.error);
        let plan = result.data.unwrap();
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.total_time, "55 minutes");
        assert_eq!(plan.steps[1].bus_number.as_deref(), Some("500D"));
        assert!(plan.maps_url.contains("waypoints=Marathahalli&"));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn debug_prompt_is_the_prompt_sent() {
        let backend = Arc::new(FixtureBackend::new().reply(PLAN_JSON));
        let plan = planner(&backend)
            .plan_trip(request().with_notes("window seat"))
            .await
            .into_result()
            .unwrap();

        assert_eq!(backend.prompts(), vec![plan.debug_prompt.clone()]);
        assert!(plan.debug_prompt.contains("User Preferences: window seat"));
    }

    #[tokio::test]
    async fn invalid_input_makes_no_model_call() {
        let backend = Arc::new(FixtureBackend::new().reply(PLAN_JSON));
        let planner = planner(&backend);

        for req in [
            TripRequest::new("ab", "Whitefield"),
            TripRequest::new("Silk Board", "KR"),
            TripRequest::new("", ""),
        ] {
            let result = planner.plan_trip(req).await;
            assert_eq!(result, PlanTripResult::failure(INVALID_INPUT_MESSAGE));
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_back_off_then_succeed() {
        let backend = Arc::new(
            FixtureBackend::new()
                .fail("Google API error (status 429 Too Many Requests): quota")
                .fail("429")
                .fail("429")
                .reply(PLAN_JSON),
        );
        let result = planner(&backend).plan_trip(request()).await;

        assert!(result.success);
        let instants: Vec<Instant> = backend.call_instants();
        assert_eq!(instants.len(), 4);
        let gaps: Vec<Duration> = instants.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            gaps,
            vec![
                Duration::from_millis(1500),
                Duration::from_millis(3000),
                Duration::from_millis(6000)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_rate_limit_stops_after_four_attempts() {
        let backend = Arc::new(
            FixtureBackend::new().otherwise(FixtureReply::Error("HTTP 429: rate limit".into())),
        );
        let result = planner(&backend).plan_trip(request()).await;

        assert_eq!(result, PlanTripResult::failure(RATE_LIMIT_MESSAGE));
        assert_eq!(backend.call_count(), 4);
    }

    #[tokio::test]
    async fn other_errors_fail_fast() {
        let backend = Arc::new(FixtureBackend::new().fail("network unreachable").reply(PLAN_JSON));
        let result = planner(&backend).plan_trip(request()).await;

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.starts_with("Failed to generate trip plan. "));
        assert!(error.contains("network unreachable"));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn fenced_output_is_repaired() {
        let backend = Arc::new(FixtureBackend::new().reply(format!("```json\n{PLAN_JSON}\n```")));
        let result = planner(&backend).plan_trip(request()).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn malformed_output_is_not_retried() {
        let backend = Arc::new(
            FixtureBackend::new()
                .reply(r#"{"summary": "Bus 429", "steps": "none"}"#)
                .reply(PLAN_JSON),
        );
        let err = planner(&backend).try_plan(&request(), None).await.unwrap_err();

        assert!(matches!(err, PlannerError::MalformedOutput { .. }));
        assert!(err.user_message().starts_with("Failed to generate trip plan. "));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_itinerary_is_a_failure() {
        let backend = Arc::new(FixtureBackend::new().reply(
            r#"{"summary": "Nothing to do", "steps": [], "eta": "0 minutes", "estimatedCost": "₹0"}"#,
        ));
        let err = planner(&backend).try_plan(&request(), None).await.unwrap_err();
        assert_eq!(err, PlannerError::EmptyItinerary);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_pending_backoff() {
        let backend = Arc::new(FixtureBackend::new().otherwise(FixtureReply::Error("429".into())));
        let planner = planner(&backend);
        let token = CancellationToken::new();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(2000)).await;
                token.cancel();
            })
        };

        let err = planner.try_plan(&request(), Some(&token)).await.unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err, PlannerError::Cancelled);
        // first call at 0s, second at 1.5s, cancelled during the 3s backoff
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_call_times_out_as_upstream_failure() {
        let backend = Arc::new(
            FixtureBackend::new()
                .reply(PLAN_JSON)
                .with_latency(Duration::from_secs(5)),
        );
        let planner = planner(&backend).with_settings(PlannerSettings {
            request_timeout: Some(Duration::from_secs(2)),
            ..PlannerSettings::default()
        });

        let err = planner.try_plan(&request(), None).await.unwrap_err();
        assert_eq!(err.kind(), "upstream");
        assert!(err.to_string().contains("timed out after 2s"));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_does_not_count_against_the_call_timeout() {
        let mut config = BuswiseConfig::default();
        config.retry.max_attempts = 8;
        config.retry.jitter = false;
        assert_eq!(config.planner.request_timeout_secs, 120);

        let backend = Arc::new(
            FixtureBackend::new().otherwise(FixtureReply::Error("429 Too Many Requests".into())),
        );
        let planner = TripPlanner::from_config(backend.clone(), &config);
        let started = Instant::now();
        let result = planner.plan_trip(request()).await;

        assert_eq!(result, PlanTripResult::failure(RATE_LIMIT_MESSAGE));
        assert_eq!(backend.call_count(), 8);
        assert!(started.elapsed() > Duration::from_secs(120));
    }

    #[tokio::test]
    async fn config_drives_validation_and_maps() {
        let mut config = BuswiseConfig::default();
        config.planner.min_location_chars = 12;
        config.planner.maps_base_url = "https://maps.example.test/dir/".into();

        let backend = Arc::new(FixtureBackend::new().otherwise(FixtureReply::Text(PLAN_JSON.into())));
        let planner = TripPlanner::from_config(backend.clone(), &config);

        let rejected = planner.plan_trip(request()).await;
        assert_eq!(rejected.error.as_deref(), Some(INVALID_INPUT_MESSAGE));

        let plan = planner
            .plan_trip(TripRequest::new("Central Silk Board", "Whitefield TTMC"))
            .await
            .into_result()
            .unwrap();
        assert!(plan.maps_url.starts_with("https://maps.example.test/dir/?api=1"));
    }

    #[test]
    fn retry_policy_maps_from_config() {
        let retry = retry_config(&RetryPolicyConfig::default());
        assert_eq!(retry, RetryConfig::default());
    }

    #[test]
    fn upstream_errors_are_classified() {
        assert!(upstream_error(anyhow::anyhow!("Quota exceeded for model")).is_rate_limited());
        assert_eq!(
            upstream_error(anyhow::anyhow!("connection reset")),
            PlannerError::Upstream {
                message: "connection reset".into()
            }
        );
        assert_eq!(upstream_error(Cancelled.into()), PlannerError::Cancelled);
    }
}
