//! Upstream chat completion client.
//!
//! The search core only needs "send a chat prompt, get a raw completion back".
//! [`ChatClient`] is that seam; [`OpenAiClient`] is the production
//! implementation talking to an OpenAI-compatible endpoint.

pub mod openai;
pub mod types;

pub use openai::OpenAiClient;
pub use types::{ChatCompletion, ChatMessage, Role, TokenUsage};

/// Failure name for completion bodies that cannot be decoded
pub const DECODE_ERROR: &str = "DecodeError";

/// Structural description of a failed upstream call.
///
/// Classification only looks at these fields, so failures produced by the real
/// HTTP client and hand-built ones from test doubles are treated the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name}: {message}")]
pub struct UpstreamFailure {
    /// HTTP status, when the endpoint answered at all
    pub status: Option<u16>,
    /// Raw `retry-after` header value
    pub retry_after: Option<String>,
    /// Error kind name (`APIError`, `TimeoutError`, `ConnectionError`, ...)
    pub name: String,
    pub message: String,
}

impl UpstreamFailure {
    /// An error response from the API
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            retry_after: None,
            name: "APIError".to_string(),
            message: message.into(),
        }
    }

    /// A failure without an HTTP response (timeouts, refused connections, ...)
    pub fn transport(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            retry_after: None,
            name: name.into(),
            message: message.into(),
        }
    }

    /// A 2xx response whose body is not a chat completion
    pub fn decode(message: impl Into<String>) -> Self {
        Self::transport(DECODE_ERROR, message)
    }

    /// Whether the endpoint answered successfully but with an unreadable body
    pub fn is_decode(&self) -> bool {
        self.status.is_none() && self.name == DECODE_ERROR
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// Chat completion client abstraction
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one chat completion request and return the raw completion
    async fn send(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<ChatCompletion, UpstreamFailure>;
}
