//! Common test utilities: a scripted chat client and completion builders

#![allow(dead_code)]

use llm_search::llm::types::{Choice, CompletionMessage};
use llm_search::llm::{ChatClient, ChatCompletion, ChatMessage, TokenUsage, UpstreamFailure};
use llm_search::search::{EngineSettings, RetryPolicy, SearchEngine};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Chat client double that replays scripted replies in order.
///
/// Once the script is exhausted, the last reply is repeated.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<ChatCompletion, UpstreamFailure>>>,
    last: Mutex<Option<Result<ChatCompletion, UpstreamFailure>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<ChatCompletion, UpstreamFailure>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(content: &str) -> Arc<Self> {
        Self::new(vec![Ok(completion(content))])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (model, messages) of every request received
    pub fn requests(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatClient for ScriptedClient {
    async fn send(
        &self,
        model: &str,
        messages: &[ChatMessage],
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<ChatCompletion, UpstreamFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), messages.to_vec()));

        let next = self.replies.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(UpstreamFailure::transport("Error", "script is empty"))),
        }
    }
}

pub fn completion(content: &str) -> ChatCompletion {
    ChatCompletion {
        id: Some("chatcmpl-test".to_string()),
        model: Some("gpt-4o-mini-2024-07-18".to_string()),
        choices: vec![Choice {
            message: CompletionMessage {
                role: Some("assistant".to_string()),
                content: Some(content.to_string()),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

pub fn completion_with_usage(content: &str, prompt: u64, completion_tokens: u64) -> ChatCompletion {
    ChatCompletion {
        usage: Some(TokenUsage::new(prompt, completion_tokens)),
        ..completion(content)
    }
}

/// JSON payload with `n` numbered results
pub fn results_json(n: usize) -> String {
    let results: Vec<serde_json::Value> = (1..=n)
        .map(|i| {
            serde_json::json!({
                "title": format!("Result {i}"),
                "url": format!("https://example.com/{i}"),
                "description": format!("Description {i}"),
                "score": 1.0 - i as f64 / 100.0
            })
        })
        .collect();
    serde_json::json!({ "results": results, "totalCount": n }).to_string()
}

pub fn test_settings(max_attempts: u32) -> EngineSettings {
    EngineSettings {
        model: "gpt-4o-mini".to_string(),
        timeout_ms: 1_000,
        max_attempts,
        temperature: 0.3,
        max_tokens: 2_000,
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    }
}

pub fn engine(client: Arc<ScriptedClient>, max_attempts: u32) -> SearchEngine {
    SearchEngine::new(client, test_settings(max_attempts)).with_retry_policy(fast_retry())
}
