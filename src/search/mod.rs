//! LLM-backed web search.
//!
//! The chat model is prompted to behave like a search engine; its reply is
//! normalized into [`SearchResponse`], failures are classified into
//! [`SearchError`], and transient ones are retried.

pub mod classify;
pub mod cost;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod params;
pub mod retry;

pub use classify::classify_error;
pub use cost::{calculate_cost, format_cost_info, guess_model, is_supported_model, CostInfo, Model};
pub use engine::{build_messages, build_upstream_query, EngineSettings, SearchEngine};
pub use error::SearchError;
pub use normalize::normalize_completion;
pub use params::{Language, SearchParams, Timeframe};
pub use retry::RetryPolicy;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query as sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamQuery {
    pub query: String,
    pub filters: QueryFilters,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

/// One entry of the model's answer, as parsed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Empty when the model omitted it
    pub title: String,
    /// Empty when the model omitted it
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl NormalizedResult {
    /// Lenient conversion: wrong-typed or missing fields are treated as absent.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            title: text("title").unwrap_or_default(),
            url: text("url").unwrap_or_default(),
            description: text("description"),
            date: text("date"),
            score: value.get("score").and_then(Value::as_f64),
        }
    }
}

/// Normalized model answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<NormalizedResult>,
    pub total_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostInfo>,
}

/// Caller-facing search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

/// Results of one search plus the estimated cost of producing them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_info: Option<CostInfo>,
}
