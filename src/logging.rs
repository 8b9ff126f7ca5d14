use crate::config::settings::DebugLogRotation;
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "llm-search.log";

/// Keeps the file writer alive; dropping it flushes pending log lines.
#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// Initialize logging.
///
/// Logs always go to stderr (stdout carries tool output). When
/// `debug_log_path` is set, the same events are also written to a log file
/// using the configured rotation.
pub fn init(config: &Config) -> Result<Option<LogGuard>> {
    let filter = build_filter(&config.log_level);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard, log_path) = match config.debug_log_path.as_deref() {
        Some(raw) => {
            let rotation = config.debug_log_rotation.unwrap_or(DebugLogRotation::None);
            let (writer, path, guard) = open_log_writer(raw, rotation, config.debug_log_keep)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard), Some(path))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .ok(); // If already initialized (e.g., in tests), don't crash.

    if let Some(path) = log_path {
        tracing::info!(log_file = %path.display(), "writing logs to file");
    }

    Ok(guard.map(LogGuard))
}

/// `RUST_LOG` wins; otherwise our crate logs at `level` and dependencies at warn.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("llm_search={level},warn")))
        .unwrap_or_else(|_| EnvFilter::new("llm_search=info,warn"))
}

fn open_log_writer(
    raw: &str,
    rotation: DebugLogRotation,
    keep: Option<usize>,
) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    let base = resolve_base_log_path(raw);

    match rotation {
        DebugLogRotation::None => {
            ensure_parent_dir(&base)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&base)
                .with_context(|| format!("Failed to open log file: {}", base.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, base, guard))
        }
        DebugLogRotation::Daily => {
            let (dir, base_name) = split_dir_and_name(&base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            cleanup_rotated_logs(&dir, &format!("{base_name}."), keep.unwrap_or(7))?;

            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((writer, base, guard))
        }
        DebugLogRotation::Session => {
            let (dir, base_name) = split_dir_and_name(&base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            cleanup_rotated_logs(&dir, &format!("{base_name}.session-"), keep.unwrap_or(20))?;

            let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let session_path = dir.join(format!("{base_name}.session-{ts}"));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&session_path)
                .with_context(|| format!("Failed to open log file: {}", session_path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, session_path, guard))
        }
    }
}

fn resolve_base_log_path(raw: &str) -> PathBuf {
    let path = PathBuf::from(expand_tilde(raw));

    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return path.join(LOG_FILE_NAME);
    }
    path
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let suffix = raw.strip_prefix('~').unwrap_or("");
            return format!("{}{}", home.display(), suffix);
        }
    }
    raw.to_string()
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    Ok(())
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

/// Remove rotated files starting with `prefix`, keeping the newest `keep`.
fn cleanup_rotated_logs(dir: &Path, prefix: &str, keep: usize) -> Result<()> {
    if keep == 0 {
        return Ok(());
    }

    let mut candidates: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else { continue };
        if name.starts_with(prefix) {
            candidates.push(name.to_string());
        }
    }

    // Date/timestamp suffixes sort lexicographically; newest first.
    candidates.sort();
    candidates.reverse();

    for name in candidates.iter().skip(keep) {
        let path = dir.join(name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}

/// Best-effort redaction for common API key patterns (e.g. `sk-...`).
pub fn redact_secrets(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut last = 0usize;
    let mut i = 0usize;

    while i < input.len() {
        if input[i..].starts_with("sk-") {
            let mut j = i + 3;
            while j < input.len() {
                match bytes[j] {
                    b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => j += 1,
                    _ => break,
                }
            }

            // Require a minimum length to reduce false positives.
            if j - (i + 3) >= 8 {
                out.push_str(&input[last..i]);
                out.push_str("sk-***REDACTED***");
                last = j;
                i = j;
                continue;
            }
        }

        i += input[i..].chars().next().map_or(1, char::len_utf8);
    }

    out.push_str(&input[last..]);
    out
}
