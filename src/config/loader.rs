//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::bounding::MIN_OUTPUT_CHARS;
use crate::error::ConfigError;

use super::env::apply_runtime_env_overrides;
use super::sources::{config_root_dir, read_config_text_with_sources, ConfigSource};
use super::Config;

/// Config plus the source it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&config_text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;
    tracing::debug!(source = %source.describe(), model = %config.api.model, "config loaded");
    Ok(LoadedConfig { config, source })
}

/// Reject settings that would make a session meaningless.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "api.base_url must not be empty (or set TALLY_BASE_URL)".into(),
        ));
    }
    if config.tool.program.trim().is_empty() {
        return Err(ConfigError::Invalid("tool.program must not be empty".into()));
    }
    if config.agent.max_turns == 0 {
        return Err(ConfigError::Invalid("agent.max_turns must be at least 1".into()));
    }
    if config.retry.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "retry.max_attempts must be at least 1".into(),
        ));
    }
    let output = &config.output;
    if output.char_limit < MIN_OUTPUT_CHARS || output.char_limit > output.max_char_limit {
        return Err(ConfigError::Invalid(format!(
            "output.char_limit must be between {MIN_OUTPUT_CHARS} and output.max_char_limit ({}), got {}",
            output.max_char_limit, output.char_limit
        )));
    }
    Ok(())
}
