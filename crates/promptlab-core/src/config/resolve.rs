use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::types::PromptLabConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PROMPTLAB_CONFIG";

/// Where the resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Config files searched, in priority order:
/// 1. `$PROMPTLAB_CONFIG`
/// 2. `.promptlab/config.toml` (project)
/// 3. `~/.config/promptlab/config.toml` (user)
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        paths.push(PathBuf::from(explicit));
    }
    paths.push(PathBuf::from(".promptlab/config.toml"));
    if let Some(home) = home_dir() {
        paths.push(home.join(".config/promptlab/config.toml"));
    }
    paths
}

/// Resolve the configuration from the standard search paths.
///
/// First readable file wins; falls back to the built-in defaults.
pub fn resolve_config() -> (PromptLabConfig, ConfigSource) {
    resolve_config_from(&config_search_paths())
}

/// Resolve from an explicit candidate list. Missing files are skipped
/// silently, broken ones with a warning.
pub fn resolve_config_from(candidates: &[PathBuf]) -> (PromptLabConfig, ConfigSource) {
    for path in candidates {
        if !path.is_file() {
            continue;
        }
        match load_config_file(path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                return (config, ConfigSource::File(path.clone()));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "skipping config");
            }
        }
    }
    (PromptLabConfig::default(), ConfigSource::Defaults)
}

/// Load and sanitize one config file.
pub fn load_config_file(path: &Path) -> Result<PromptLabConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: PromptLabConfig =
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config.sanitized())
}

/// Platform-aware home directory lookup.
fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
