use llm_search::config::settings::DebugLogRotation;
use llm_search::config::{load_config_file, Config};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_config_file(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.api_base, "https://api.openai.com/v1");
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.timeout_ms, 30_000);
    assert_eq!(config.max_attempts, 3);
    assert!(config.api_key.is_empty());
}

#[test]
fn partial_file_fills_remaining_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
api_key = "sk-file"
model = "gpt-4o"
max_attempts = 5
debug_log_path = "~/logs/"
debug_log_rotation = "daily"
debug_log_keep = 7
"#,
    )
    .unwrap();

    let config = load_config_file(&path).unwrap();
    assert_eq!(config.api_key, "sk-file");
    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.timeout_ms, 30_000);
    assert_eq!(config.debug_log_path.as_deref(), Some("~/logs/"));
    assert_eq!(config.debug_log_rotation, Some(DebugLogRotation::Daily));
    assert_eq!(config.debug_log_keep, Some(7));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "timeout_ms = \"soon\"").unwrap();

    let err = load_config_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config file"));
}

#[test]
fn env_overrides_file_values() {
    let mut config = Config {
        api_key: "sk-file".to_string(),
        ..Config::default()
    };

    config
        .apply_env_overrides(env(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("OPENAI_MODEL", "o3-mini"),
            ("SEARCH_TIMEOUT_MS", "5000"),
            ("SEARCH_MAX_ATTEMPTS", "1"),
            ("LOG_LEVEL", "DEBUG"),
        ]))
        .unwrap();

    assert_eq!(config.api_key, "sk-env");
    assert_eq!(config.api_base, "http://localhost:8080/v1");
    assert_eq!(config.model, "o3-mini");
    assert_eq!(config.timeout_ms, 5_000);
    assert_eq!(config.max_attempts, 1);
    assert_eq!(config.log_level, "debug");
}

#[test]
fn empty_env_values_are_ignored() {
    let mut config = Config::default();
    config
        .apply_env_overrides(env(&[("OPENAI_MODEL", "  "), ("SEARCH_TIMEOUT_MS", "")]))
        .unwrap();

    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.timeout_ms, 30_000);
}

#[test]
fn non_numeric_env_value_is_rejected() {
    let mut config = Config::default();
    let err = config
        .apply_env_overrides(env(&[("SEARCH_MAX_ATTEMPTS", "three")]))
        .unwrap_err();
    assert!(err.to_string().contains("SEARCH_MAX_ATTEMPTS"));
}

#[test]
fn validate_requires_api_key() {
    let err = Config::default().validate().unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn validate_rejects_zero_limits() {
    let base = Config {
        api_key: "sk-test".to_string(),
        ..Config::default()
    };
    assert!(base.validate().is_ok());

    let zero_timeout = Config {
        timeout_ms: 0,
        ..base.clone()
    };
    assert!(zero_timeout.validate().is_err());

    let zero_attempts = Config {
        max_attempts: 0,
        ..base
    };
    assert!(zero_attempts.validate().is_err());
}

#[test]
fn debug_output_masks_api_key() {
    let config = Config {
        api_key: "sk-very-secret-value".to_string(),
        ..Config::default()
    };
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("sk-very-secret-value"));
    assert!(rendered.contains("***"));
}
