use std::time::Duration;

/// Search-related errors
///
/// Every upstream transport failure is classified into one of these variants
/// before it reaches the retry loop or the caller. `Parse` is raised by the
/// response normalizer after a transport-level success.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("Authentication failed: invalid or missing API key ({0})")]
    Auth(String),

    #[error("Rate limit exceeded, retry after {}s", .retry_after.as_secs_f64())]
    RateLimit { retry_after: Duration },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid parameters: {0}")]
    Validation(String),

    #[error("Failed to parse search response: {0}")]
    Parse(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl SearchError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::RateLimit { .. }
                | SearchError::Timeout { .. }
                | SearchError::Network(_)
                | SearchError::Unknown(_)
        )
    }

    /// Short machine-readable kind name
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Auth(_) => "auth",
            SearchError::RateLimit { .. } => "rate_limit",
            SearchError::Timeout { .. } => "timeout",
            SearchError::Network(_) => "network",
            SearchError::Validation(_) => "validation",
            SearchError::Parse(_) => "parse",
            SearchError::Unknown(_) => "unknown",
        }
    }
}
