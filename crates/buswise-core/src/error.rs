//! Planner error taxonomy and its mapping to user-facing text.

use thiserror::Error;

/// Message returned for any request that fails boundary validation.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input.";

/// Message returned when the model provider keeps throttling us.
pub const RATE_LIMIT_MESSAGE: &str = "Model API rate limit reached (quota exceeded). \
Please wait ~30-60 seconds and try again, or enable billing/increase quota for your API key.";

/// Prefix of every other failure message; the underlying error text follows.
pub const GENERIC_FAILURE_PREFIX: &str = "Failed to generate trip plan. ";

/// Everything that can go wrong while planning a trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// The request failed boundary validation; no model call was made.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending field (`start`, `destination`)
        field: &'static str,
        message: String,
    },

    /// The provider kept answering with rate-limit signals.
    #[error("{message}")]
    RateLimited {
        /// Text of the last rate-limit error
        message: String,
    },

    /// Any other failure of the model call.
    #[error("{message}")]
    Upstream { message: String },

    /// The model answered, but not with a usable itinerary.
    #[error("malformed planner output: {message}")]
    MalformedOutput { message: String },

    /// The model answered with a schema-valid itinerary that has no steps.
    #[error("the model returned an itinerary with no steps")]
    EmptyItinerary,

    /// The prompt template could not be rendered.
    #[error("prompt rendering failed: {message}")]
    Prompt { message: String },

    /// The caller abandoned the request.
    #[error("trip planning was cancelled")]
    Cancelled,
}

impl PlannerError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PlannerError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        PlannerError::MalformedOutput {
            message: message.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PlannerError::RateLimited { .. })
    }

    /// Short stable identifier, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::Validation { .. } => "validation",
            PlannerError::RateLimited { .. } => "rate_limited",
            PlannerError::Upstream { .. } => "upstream",
            PlannerError::MalformedOutput { .. } => "malformed_output",
            PlannerError::EmptyItinerary => "empty_itinerary",
            PlannerError::Prompt { .. } => "prompt",
            PlannerError::Cancelled => "cancelled",
        }
    }

    /// Text shown to the person who asked for the trip.
    ///
    /// Validation failures are deliberately field-agnostic.
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Validation { .. } => INVALID_INPUT_MESSAGE.to_string(),
            PlannerError::RateLimited { .. } => RATE_LIMIT_MESSAGE.to_string(),
            PlannerError::Cancelled => "Trip planning was cancelled.".to_string(),
            other => format!("{GENERIC_FAILURE_PREFIX}{other}"),
        }
    }
}

/// Result alias for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;
