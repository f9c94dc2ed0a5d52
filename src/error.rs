//! Unified error types.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the model backend HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error (includes per-call timeouts).
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status { code: u16, body: String },
    /// The backend answered but the payload was unusable.
    InvalidResponse(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Http(_) | Self::InvalidResponse(_) => None,
        }
    }

    /// Network hiccups, rate limits and server-side failures.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(inner) => inner.is_timeout() || inner.is_connect(),
            Self::Status { code, .. } => *code == 429 || (500..=599).contains(code),
            Self::InvalidResponse(_) => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// GatewayError
// ---------------------------------------------------------------------------

/// Failures to run the external tool at all (as opposed to non-zero exits).
#[derive(Debug)]
pub enum GatewayError {
    /// The executable could not be found.
    NotInstalled(String),
    /// Spawning or waiting on the child failed for another reason.
    Spawn(String),
    /// The child did not exit within the configured limit.
    TimedOut(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled(program) => write!(
                f,
                "'{program}' command not found. Ensure it is installed and in your PATH."
            ),
            Self::Spawn(msg) => write!(f, "failed to run tool: {msg}"),
            Self::TimedOut(msg) => write!(f, "tool timed out: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

// ---------------------------------------------------------------------------
// PrepareError
// ---------------------------------------------------------------------------

/// Errors while preparing the input file before a session starts.
#[derive(Debug)]
pub enum PrepareError {
    NotFound(String),
    Io(std::io::Error),
    InvalidDelimiter(String),
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "input file not found: {path}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::InvalidDelimiter(raw) => write!(
                f,
                "invalid delimiter `{raw}`: expected one character, `\\t`, or tab/comma/semicolon/pipe"
            ),
        }
    }
}

impl std::error::Error for PrepareError {}

impl From<std::io::Error> for PrepareError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// AgentError (internal to the session loop)
// ---------------------------------------------------------------------------

/// Errors that abort the command-synthesis loop.
#[derive(Debug)]
pub enum AgentError {
    Api(ApiError),
    Gateway(GatewayError),
    /// `<tool> -h` ran but exited non-zero.
    HelpUnavailable(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "api: {e}"),
            Self::Gateway(e) => write!(f, "tool: {e}"),
            Self::HelpUnavailable(stderr) => write!(f, "tool help unavailable: {stderr}"),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ApiError> for AgentError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<GatewayError> for AgentError {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}
