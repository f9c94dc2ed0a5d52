//! Configuration loading from TOML files and environment variables.
//!
//! Precedence (highest wins):
//! 1. CLI flags (applied by the binary after loading).
//! 2. Environment variables (`TALLY_API_KEY`, `TALLY_BASE_URL`, `TALLY_MODEL`,
//!    `TALLY_TOOL`, `TALLY_API_TIMEOUT_SECS`).
//! 3. TOML file from `--config`, else `./tally.toml`, else
//!    `$XDG_CONFIG_HOME/tally/tally.toml` (or `~/.config/tally/tally.toml`).
//! 4. Built-in defaults.

mod defaults;
mod env;
mod loader;
mod sources;
mod types;

pub use defaults::DEFAULT_CONFIG_TEMPLATE;
pub use loader::{load_config, validate, LoadedConfig};
pub use sources::{config_root_dir, ConfigSource};
pub use types::{
    AgentConfig, ApiConfig, Config, DisplayConfig, OutputConfig, RetryConfig, ToolConfig,
};
