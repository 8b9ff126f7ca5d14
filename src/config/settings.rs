use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Process-wide configuration, read once at start-up
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the chat completion endpoint
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API (including `/v1`)
    pub api_base: String,

    /// Model used to answer search prompts
    pub model: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Total attempts per search, including the first one
    pub max_attempts: u32,

    /// Sampling temperature for the search prompt
    pub temperature: f32,

    /// Completion token cap for the search prompt
    pub max_tokens: u32,

    /// Log verbosity (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,

    /// Optional log file path. When set, logs are also written to this file.
    ///
    /// If this points to a directory (or ends with `/`), `llm-search.log` is
    /// created inside it. `~` is expanded to the home directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    /// Log file rotation strategy.
    ///
    /// - `none`: append to a single file
    /// - `daily`: rotate daily (`llm-search.log.YYYY-MM-DD`)
    /// - `session`: one file per process start (`llm-search.log.session-YYYYmmdd-HHMMSS`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// Number of rotated log files to keep. `0` disables cleanup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: 30_000,
            max_attempts: 3,
            temperature: 0.3,
            max_tokens: 4000,
            log_level: "info".to_string(),
            debug_log_path: None,
            debug_log_rotation: None,
            debug_log_keep: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "<unset>" } else { "***" };
        f.debug_struct("Config")
            .field("api_key", &api_key)
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_attempts", &self.max_attempts)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("log_level", &self.log_level)
            .field("debug_log_path", &self.debug_log_path)
            .field("debug_log_rotation", &self.debug_log_rotation)
            .field("debug_log_keep", &self.debug_log_keep)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    None,
    Daily,
    Session,
}

impl Config {
    /// Apply environment overrides, reading variables through `lookup`.
    ///
    /// Recognised variables: `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL`,
    /// `SEARCH_TIMEOUT_MS`, `SEARCH_MAX_ATTEMPTS`, `LOG_LEVEL`. Empty values are
    /// ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPENAI_API_KEY") {
            self.api_key = v.trim().to_string();
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.api_base = v.trim().to_string();
        }
        if let Some(v) = get("OPENAI_MODEL") {
            self.model = v.trim().to_string();
        }
        if let Some(v) = get("SEARCH_TIMEOUT_MS") {
            self.timeout_ms = v
                .trim()
                .parse()
                .with_context(|| format!("SEARCH_TIMEOUT_MS is not a valid integer: {v}"))?;
        }
        if let Some(v) = get("SEARCH_MAX_ATTEMPTS") {
            self.max_attempts = v
                .trim()
                .parse()
                .with_context(|| format!("SEARCH_MAX_ATTEMPTS is not a valid integer: {v}"))?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v.trim().to_lowercase();
        }

        Ok(())
    }

    /// Reject configurations the search core cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("API key is not configured. Set OPENAI_API_KEY or api_key in the config file.");
        }
        if self.model.trim().is_empty() {
            bail!("model must not be empty");
        }
        if self.timeout_ms == 0 {
            bail!("timeout_ms must be greater than 0");
        }
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        Ok(())
    }
}
