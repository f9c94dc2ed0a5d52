//! Config-file source discovery.
//!
//! Order: explicit path > local `./tally.toml` > global file > built-in defaults.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Where the active config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit `--config` path.
    Explicit(PathBuf),
    /// `./tally.toml` in the working directory.
    Local,
    /// `<config root>/tally/tally.toml`.
    Global(PathBuf),
    /// No file found; defaults apply.
    BuiltInDefaults,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Explicit(path) | Self::Global(path) => path.display().to_string(),
            Self::Local => "./tally.toml".to_string(),
            Self::BuiltInDefaults => "built-in defaults".to_string(),
        }
    }
}

/// Read config text from the highest-precedence available source.
pub(super) fn read_config_text_with_sources<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    // An explicit path must exist.
    if let Some(p) = path_override {
        let path = PathBuf::from(p);
        let text = read_file(&path)?;
        return Ok((text, ConfigSource::Explicit(path)));
    }

    if let Ok(text) = read_file(Path::new("tally.toml")) {
        return Ok((text, ConfigSource::Local));
    }
    if let Some(dir) = config_root() {
        let global = dir.join("tally").join("tally.toml");
        if let Ok(text) = read_file(&global) {
            return Ok((text, ConfigSource::Global(global)));
        }
    }

    Ok((String::new(), ConfigSource::BuiltInDefaults))
}

/// Platform config root: `$XDG_CONFIG_HOME`, else `~/.config`.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}
