pub mod settings;

pub use settings::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the default configuration file path (`~/.config/llm-search/config.toml`)
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("llm-search");

    Ok(config_dir.join("config.toml"))
}

/// Read a configuration file. A missing file yields the defaults.
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Resolve the effective configuration: defaults, then the config file, then
/// environment variables.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    let mut config = load_config_file(&path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}
