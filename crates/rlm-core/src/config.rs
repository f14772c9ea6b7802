//! Environment-driven configuration.
//!
//! All settings come from `RLM_*` environment variables with documented
//! defaults; only the API key is mandatory. The key resolves from
//! `RLM_OPENAI_API_KEY` first, then from the file named by
//! `RLM_OPENAI_API_KEY_FILE`, first non-empty wins.

use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Default base URL for the chat-completions API.
pub const DEFAULT_BASE_URL: &str = "https://api.us-west-2.modal.direct/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "zai-org/GLM-5-FP8";

/// Token cap for the raw smoke completion.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Depth ceiling for nested subqueries.
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Iteration ceiling for the completion loop.
pub const DEFAULT_MAX_ITERATIONS: u32 = 8;

/// Directory trajectory logs are written to.
pub const DEFAULT_LOG_DIR: &str = ".rlm_logs";

const API_KEY_VAR: &str = "RLM_OPENAI_API_KEY";
const API_KEY_FILE_VAR: &str = "RLM_OPENAI_API_KEY_FILE";
const BASE_URL_VAR: &str = "RLM_OPENAI_BASE_URL";
const MODEL_VAR: &str = "RLM_MODEL_NAME";

/// Errors raised while building configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Neither key variable yielded a usable key.
    #[error(
        "Missing API key. Set RLM_OPENAI_API_KEY or RLM_OPENAI_API_KEY_FILE in your environment."
    )]
    MissingApiKey,

    /// The key file named by `RLM_OPENAI_API_KEY_FILE` could not be read.
    #[error("failed to read API key file '{path}': {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved configuration for one harness invocation.
#[derive(Clone)]
pub struct RlmConfig {
    /// Bearer token for the chat-completions API.
    pub api_key: String,

    /// Base URL of the OpenAI-compatible server.
    pub base_url: String,

    /// Model name sent with each request.
    pub model: String,

    /// Token cap for the raw smoke completion.
    pub max_tokens: u32,

    /// Depth ceiling for nested subqueries.
    pub max_depth: u32,

    /// Iteration ceiling for the completion loop.
    pub max_iterations: u32,

    /// Directory trajectory logs are written to.
    pub log_dir: PathBuf,
}

impl RlmConfig {
    /// Builds configuration from the process environment.
    ///
    /// Returns [`ConfigError::MissingApiKey`] when no key can be resolved.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests inject their own lookup instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = resolve_api_key(&lookup)?;
        let base_url =
            trimmed(&lookup, BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = trimmed(&lookup, MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        debug!(base_url = %base_url, model = %model, "Configuration resolved");

        Ok(Self {
            api_key,
            base_url,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_depth: DEFAULT_MAX_DEPTH,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        })
    }

    /// Returns the session ceilings carried by this configuration.
    pub fn limits(&self) -> crate::session::SessionLimits {
        crate::session::SessionLimits {
            max_depth: self.max_depth,
            max_iterations: self.max_iterations,
            max_tokens: self.max_tokens,
        }
    }
}

impl fmt::Debug for RlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("max_depth", &self.max_depth)
            .field("max_iterations", &self.max_iterations)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

/// Looks up a variable, treating whitespace-only values as unset.
fn trimmed<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolves the API key: direct variable first, then the key file.
fn resolve_api_key<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = trimmed(lookup, API_KEY_VAR) {
        return Ok(key);
    }

    if let Some(path) = trimmed(lookup, API_KEY_FILE_VAR) {
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::KeyFile {
            path: path.clone(),
            source,
        })?;
        let token = contents.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }

    Err(ConfigError::MissingApiKey)
}
