use crate::llm::UpstreamFailure;
use crate::logging::redact_secrets;
use crate::search::SearchError;
use std::time::Duration;

/// Wait applied to a 429 without a usable `retry-after` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

const TIMEOUT_NAMES: [&str; 2] = ["AbortError", "TimeoutError"];
const TIMEOUT_MARKERS: [&str; 4] = ["timed out", "timeout", "time out", "abort"];
const NETWORK_MARKERS: [&str; 3] = ["network", "econnrefused", "connection refused"];

fn mentions_any(text: &str, markers: &[&str]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

/// Map an upstream failure onto the search error taxonomy.
///
/// Checks, in order: HTTP status, undecodable body, timeout signature,
/// connectivity signature. Anything else becomes [`SearchError::Unknown`].
pub fn classify_error(failure: &UpstreamFailure, timeout_ms: u64) -> SearchError {
    let message = redact_secrets(&failure.message);

    if let Some(status) = failure.status {
        return match status {
            401 => SearchError::Auth(message),
            429 => SearchError::RateLimit {
                retry_after: parse_retry_after(failure.retry_after.as_deref()),
            },
            500..=u16::MAX => SearchError::Network(format!("server error ({status}): {message}")),
            _ => SearchError::Network(format!("API error ({status}): {message}")),
        };
    }

    if failure.is_decode() {
        return SearchError::Parse(message);
    }

    if TIMEOUT_NAMES.contains(&failure.name.as_str()) || mentions_any(&message, &TIMEOUT_MARKERS) {
        return SearchError::Timeout { timeout_ms };
    }

    if mentions_any(&message, &NETWORK_MARKERS) {
        return SearchError::Network(message);
    }

    SearchError::Unknown(format!("{}: {}", failure.name, message))
}

/// Parse a `retry-after` header given in seconds
pub fn parse_retry_after(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}
