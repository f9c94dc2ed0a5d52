//! Environment overrides.
//!
//! `TALLY_*` variables win over file values. The API key falls back to the
//! variable named by `api.api_key_env` (default `OPENAI_API_KEY`).

use crate::error::ConfigError;

use super::Config;

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_empty(env_lookup("TALLY_BASE_URL")) {
        config.api.base_url = url;
    }
    if let Some(model) = non_empty(env_lookup("TALLY_MODEL")) {
        config.api.model = model;
    }
    if let Some(program) = non_empty(env_lookup("TALLY_TOOL")) {
        config.tool.program = program;
    }
    if let Some(timeout) = non_empty(env_lookup("TALLY_API_TIMEOUT_SECS")) {
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid TALLY_API_TIMEOUT_SECS value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        // At least one second.
        config.api.timeout_secs = parsed.max(1);
    }
    config.api.api_key = resolve_api_key(config, env_lookup);
    Ok(())
}

/// `TALLY_API_KEY` > inline `api_key` > `api_key_env` variable > empty.
fn resolve_api_key<FEnv>(config: &Config, env_lookup: &FEnv) -> String
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(key) = non_empty(env_lookup("TALLY_API_KEY")) {
        return key;
    }
    let inline = config.api.api_key.trim();
    if !inline.is_empty() {
        return inline.to_string();
    }
    config
        .api
        .api_key_env
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .and_then(|name| non_empty(env_lookup(name)))
        .unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
