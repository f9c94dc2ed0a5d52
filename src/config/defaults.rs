//! Default configuration constants.

/// Commented default `tally.toml`, kept in sync with the values below.
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/tally.toml");
/// Default OpenAI-compatible API base URL.
pub(super) const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
/// Environment variable holding the API key when none is configured inline.
pub(super) const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub(super) const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 60;
pub(super) const DEFAULT_MAX_TURNS: usize = 15;
pub(super) const DEFAULT_TEMPERATURE: f64 = 0.1;
pub(super) const DEFAULT_COMMAND_MAX_TOKENS: u32 = 400;
pub(super) const DEFAULT_ANSWER_MAX_TOKENS: u32 = 300;
pub(super) const DEFAULT_TOOL_PROGRAM: &str = "xsv";
pub(super) const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;
pub(super) const DEFAULT_OUTPUT_CHAR_LIMIT: usize = 4000;
pub(super) const DEFAULT_OUTPUT_MAX_CHAR_LIMIT: usize = 10_000;
pub(super) const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub(super) const DEFAULT_RETRY_BACKOFF_SECS: u64 = 5;
