//! Command-level errors and their exit codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or the backend not created.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The planner answered with a failure.
    #[error("{message}")]
    Planning { message: String },

    /// The prompt could not be rendered.
    #[error("Prompt error: {message}")]
    Prompt { message: String },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Planning { .. } => 1, // General error
            CliError::Prompt { .. } => 1,
            CliError::Config { .. } => 78, // EX_CONFIG
            CliError::Json(_) => 65,       // EX_DATAERR
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planner_failures_exit_with_one() {
        let err = CliError::Planning {
            message: "Invalid input.".into(),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "Invalid input.");
    }

    #[test]
    fn config_errors_use_ex_config() {
        let err = CliError::Config {
            message: "missing key".into(),
        };
        assert_eq!(err.exit_code(), 78);
    }
}
