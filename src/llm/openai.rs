use crate::config::Config;
use crate::llm::types::{ChatCompletion, ChatCompletionRequest, ChatMessage};
use crate::llm::{ChatClient, UpstreamFailure};
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// OpenAI-compatible chat completion client
///
/// The underlying `reqwest::Client` pools connections and is safe to share
/// between concurrent searches.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_base: String,
    api_key: String,
    timeout_ms: u64,
}

impl OpenAiClient {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            timeout_ms,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base, &config.api_key, config.timeout_ms)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn transport_failure(&self, err: reqwest::Error) -> UpstreamFailure {
        if err.is_timeout() {
            UpstreamFailure::transport(
                "TimeoutError",
                format!("Request timed out after {}ms", self.timeout_ms),
            )
        } else if err.is_connect() {
            UpstreamFailure::transport(
                "ConnectionError",
                format!("Network error: connection refused or unreachable ({err})"),
            )
        } else {
            UpstreamFailure::transport("RequestError", err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl ChatClient for OpenAiClient {
    async fn send(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<ChatCompletion, UpstreamFailure> {
        let url = self.endpoint();

        tracing::debug!(
            url = %url,
            model = %model,
            message_count = messages.len(),
            max_tokens,
            "chat completion request"
        );

        let request_body = ChatCompletionRequest {
            model,
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            tracing::warn!(
                status = %status,
                error = %crate::logging::redact_secrets(&error_text),
                "chat completion api returned error"
            );

            let mut failure = UpstreamFailure::api(status.as_u16(), error_text);
            failure.retry_after = retry_after;
            return Err(failure);
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_failure(e)
            } else {
                UpstreamFailure::decode(format!("Invalid completion payload: {e}"))
            }
        })?;

        tracing::debug!(
            model = completion.model.as_deref().unwrap_or("unknown"),
            choices = completion.choices.len(),
            has_usage = completion.usage.is_some(),
            "chat completion received"
        );

        Ok(completion)
    }
}
