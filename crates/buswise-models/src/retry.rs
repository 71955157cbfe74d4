//! Rate-limit aware retry with exponential backoff.
//!
//! Only errors classified as upstream throttling are retried. Anything else
//! is returned on the first attempt, and when the attempt ceiling is reached
//! the last rate-limit error is returned unchanged so callers can still
//! recognise it.

use buswise_core::log_warn;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Lower-cased substrings that mark an error as rate limiting.
const RATE_LIMIT_MARKERS: [&str; 4] = ["429", "too many requests", "quota exceeded", "rate limit"];

/// Retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    pub max_attempts: usize,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Ceiling for any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
    /// Add +/-10% jitter to every delay
    pub jitter_enabled: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 4,
            initial_delay: Duration::from_millis(1500),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter_enabled: false,
        }
    }
}

impl RetryConfig {
    pub fn new(
        max_attempts: usize,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        RetryConfig {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_multiplier,
            jitter_enabled: false,
        }
    }

    pub fn with_jitter(mut self, enabled: bool) -> Self {
        self.jitter_enabled = enabled;
        self
    }
}

/// Outcome of classifying a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Upstream throttling; worth waiting and trying again
    RateLimited,
    /// Everything else; fail fast
    Other,
}

/// Returned when the caller cancels while a call or a backoff is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request cancelled")]
pub struct Cancelled;

/// True when `message` carries any rate-limit vocabulary (case-insensitive).
///
/// This is the single place that knows what throttling looks like; keep the
/// test table below in sync when providers change their wording.
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Classify an error by its full context chain.
pub fn classify_error(error: &anyhow::Error) -> ErrorClass {
    if is_rate_limit_message(&format!("{error:#}")) {
        ErrorClass::RateLimited
    } else {
        ErrorClass::Other
    }
}

/// Retry executor. Holds no state besides its policy, so one instance can be
/// shared by any number of concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct RetryStrategy {
    config: RetryConfig,
}

impl RetryStrategy {
    pub fn new(config: RetryConfig) -> Self {
        RetryStrategy { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Whether a failure on attempt `attempt` (1-based) earns another attempt.
    pub fn should_retry(&self, error: &anyhow::Error, attempt: usize) -> bool {
        attempt < self.config.max_attempts.max(1)
            && classify_error(error) == ErrorClass::RateLimited
    }

    /// Delay to wait after failed attempt `attempt` (1-based):
    /// `initial_delay * multiplier^(attempt-1)`, capped at `max_delay`.
    pub fn next_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
        let base_millis =
            self.config.initial_delay.as_millis() as f64 * self.config.backoff_multiplier.powi(exponent);
        let capped = base_millis.min(self.config.max_delay.as_millis() as f64);

        let millis = if self.config.jitter_enabled {
            let jitter_factor = rand::rng().random_range(0.9..=1.1);
            capped * jitter_factor
        } else {
            capped
        };
        Duration::from_millis(millis.round() as u64)
    }

    /// Run `operation` until it succeeds, fails with a non-rate-limit error,
    /// or runs out of attempts.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> anyhow::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.execute_with_cancel(operation, None).await
    }

    /// Like [`execute`](Self::execute), but gives up with [`Cancelled`] as
    /// soon as `cancel` fires, whether a call or a backoff is pending.
    pub async fn execute_with_cancel<F, Fut, T>(
        &self,
        mut operation: F,
        cancel: Option<&CancellationToken>,
    ) -> anyhow::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut attempt = 1;

        loop {
            let outcome = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(Cancelled.into()),
                    result = operation() => result,
                },
                None => operation().await,
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !self.should_retry(&error, attempt) {
                return Err(error);
            }

            let delay = self.next_delay(attempt);
            log_warn!(
                "models::retry",
                attempt,
                max_attempts = self.config.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %format!("{error:#}"),
                "Rate limited by model provider, backing off"
            );

            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(Cancelled.into()),
                    _ = tokio::time::sleep(delay) => {}
                },
                None => tokio::time::sleep(delay).await,
            }
            attempt += 1;
        }
    }
}
