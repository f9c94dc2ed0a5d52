//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Loading and precedence rules
//! live in `loader`, `sources`, and `env`.

use serde::Deserialize;

use super::defaults::{
    DEFAULT_ANSWER_MAX_TOKENS, DEFAULT_API_BASE_URL, DEFAULT_API_KEY_ENV, DEFAULT_API_TIMEOUT_SECS,
    DEFAULT_COMMAND_MAX_TOKENS, DEFAULT_MAX_TURNS, DEFAULT_MODEL_ID, DEFAULT_OUTPUT_CHAR_LIMIT,
    DEFAULT_OUTPUT_MAX_CHAR_LIMIT, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_SECS,
    DEFAULT_TEMPERATURE, DEFAULT_TOOL_PROGRAM, DEFAULT_TOOL_TIMEOUT_SECS,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub agent: AgentConfig,
    pub tool: ToolConfig,
    pub output: OutputConfig,
    pub retry: RetryConfig,
    pub display: DisplayConfig,
}

/// Model backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Inline key. Prefer `api_key_env` so secrets stay out of config files.
    pub api_key: String,
    /// Environment variable consulted when `api_key` is empty.
    pub api_key_env: Option<String>,
    pub model: String,
    /// Per-request timeout; expiry counts as a transient failure.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.into(),
            api_key: String::new(),
            api_key_env: Some(DEFAULT_API_KEY_ENV.into()),
            model: DEFAULT_MODEL_ID.into(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Command-synthesis loop and answer-synthesis settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Upper bound on model calls in the command-synthesis loop.
    pub max_turns: usize,
    pub temperature: Option<f64>,
    pub command_max_tokens: Option<u32>,
    pub answer_max_tokens: Option<u32>,
    /// Skip the answer-synthesis call and present raw output only.
    pub synthesize_answer: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            temperature: Some(DEFAULT_TEMPERATURE),
            command_max_tokens: Some(DEFAULT_COMMAND_MAX_TOKENS),
            answer_max_tokens: Some(DEFAULT_ANSWER_MAX_TOKENS),
            synthesize_answer: true,
        }
    }
}

/// External row/column tool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Executable name or path.
    pub program: String,
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_TOOL_PROGRAM.into(),
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

/// Output bounding settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Budget applied when the model suggests none.
    pub char_limit: usize,
    /// Ceiling for model-suggested budgets.
    pub max_char_limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            char_limit: DEFAULT_OUTPUT_CHAR_LIMIT,
            max_char_limit: DEFAULT_OUTPUT_MAX_CHAR_LIMIT,
        }
    }
}

/// Backend retry settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per model call, including the first.
    pub max_attempts: u32,
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff_secs: DEFAULT_RETRY_BACKOFF_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
    pub show_tokens: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_tokens: true,
        }
    }
}
