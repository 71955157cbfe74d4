//! Configuration for buswise binaries.
//!
//! Settings live in `~/.buswise/config.toml` or in a project-level
//! `.buswise/config.toml` found by walking up from the working directory.
//! Every field has a default, so an absent file yields a usable configuration
//! whose retry policy matches the free-tier-friendly policy (4 attempts,
//! 1.5s base delay, doubling).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::home_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

const CONFIG_DIR: &str = ".buswise";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BuswiseConfig {
    /// Model provider selection and credentials.
    pub llm: LlmConfig,
    /// Rate-limit retry policy.
    pub retry: RetryPolicyConfig,
    /// Planner boundary settings.
    pub planner: PlannerConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend name (`google`, `openai`).
    pub provider: String,
    /// Model identifier; the backend default is used when absent.
    pub model: Option<String>,
    /// Inline API key. Prefer `api_key_env`.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Override for the provider base URL.
    pub endpoint: Option<String>,
    pub temperature: f64,
    pub max_output_tokens: Option<usize>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            model: None,
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            endpoint: None,
            temperature: 0.4,
            max_output_tokens: Some(4096),
        }
    }
}

/// Retry policy applied to rate-limited model calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryPolicyConfig {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
    /// Add +/-10% jitter to every delay.
    pub jitter: bool,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay_ms: 1500,
            backoff_multiplier: 2.0,
            max_delay_ms: 60_000,
            jitter: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    /// Minimum length, in characters, of `start` and `destination`.
    pub min_location_chars: usize,
    /// Directions endpoint used for the deep link.
    pub maps_base_url: String,
    /// Upper bound on one planning call, retries included.
    pub request_timeout_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_location_chars: 3,
            maps_base_url: "https://www.google.com/maps/dir/".to_string(),
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Number of history records returned per user.
    pub history_limit: usize,
    /// Records kept per user before the oldest are evicted.
    pub history_capacity: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:18900".to_string(),
            history_limit: 10,
            history_capacity: Some(100),
        }
    }
}

impl BuswiseConfig {
    /// Loads configuration from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str::<BuswiseConfig>(contents)?)
    }

    /// Returns the default configuration path (`$HOME/.buswise/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = home_dir().ok_or(ConfigError::HomeDirMissing)?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Resolve configuration the way the binaries do: an explicit path wins,
    /// then the nearest project config, then the global config, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = project_config_path() {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Ok(path) if path.exists() => Self::from_file(path),
            Ok(_) | Err(ConfigError::HomeDirMissing) => Ok(Self::default()),
            Err(other) => Err(other),
        }
    }

    /// API key for the configured provider, inline value first.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.llm.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        match env::var(&self.llm.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey {
                provider: self.llm.provider.clone(),
                env_var: self.llm.api_key_env.clone(),
            }),
        }
    }
}

fn project_config_path() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
        .find(|candidate| candidate.exists())
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO failure when reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unable to determine home directory for default config path")]
    HomeDirMissing,

    #[error("No API key for provider '{provider}': set llm.api_key or ${env_var}")]
    MissingApiKey { provider: String, env_var: String },
}
