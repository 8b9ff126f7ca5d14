use crate::config::Config;
use crate::llm::{ChatClient, ChatCompletion, ChatMessage};
use crate::search::classify::classify_error;
use crate::search::normalize::normalize_completion;
use crate::search::retry::RetryPolicy;
use crate::search::{
    NormalizedResult, QueryFilters, SearchError, SearchOutcome, SearchParams, SearchResult,
    UpstreamQuery,
};
use std::sync::Arc;

/// Title used for results the model returned without one
pub const NO_TITLE: &str = "no title";

const SYSTEM_PROMPT: &str = "You are a web search engine. For each query, return the most relevant real web pages you know of. \
Respond with a single JSON object and nothing else, in exactly this shape:\n\
{\"results\":[{\"title\":\"...\",\"url\":\"https://...\",\"description\":\"...\",\"date\":\"YYYY-MM-DD\",\"score\":0.0}],\"totalCount\":0}\n\
Rules:\n\
- Return at most maxResults entries, most relevant first.\n\
- score is a relevance estimate between 0 and 1; date is the publication date when known, otherwise omit it.\n\
- Honor the language and timeframe filters when present (\"auto\" means the query's own language).\n\
- Only include URLs you are confident exist.";

/// Request settings the engine needs from the process configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub model: String,
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            timeout_ms: config.timeout_ms,
            max_attempts: config.max_attempts,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Build the query sent to the model. Pure and deterministic.
pub fn build_upstream_query(params: &SearchParams) -> UpstreamQuery {
    UpstreamQuery {
        query: params.query().to_string(),
        filters: QueryFilters {
            language: Some(params.language().as_str().to_string()),
            timeframe: params.timeframe().map(|t| t.as_str().to_string()),
        },
        max_results: params.limit(),
    }
}

/// Prompt messages for one upstream query
pub fn build_messages(query: &UpstreamQuery) -> Vec<ChatMessage> {
    let payload = serde_json::json!(query);
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!("Search request:\n{payload}")),
    ]
}

/// Map normalized entries to the caller-facing shape and keep the first `limit`.
///
/// Nothing is filtered: entries without a URL stay in the list.
pub fn project_results(results: Vec<NormalizedResult>, limit: u32) -> Vec<SearchResult> {
    results
        .into_iter()
        .take(limit as usize)
        .map(|r| SearchResult {
            title: if r.title.trim().is_empty() {
                NO_TITLE.to_string()
            } else {
                r.title
            },
            url: r.url,
            snippet: r.description,
            published_date: r.date,
            relevance_score: r.score,
        })
        .collect()
}

/// Search orchestrator
///
/// Holds no per-search state; one engine can serve concurrent searches.
#[derive(Clone)]
pub struct SearchEngine {
    client: Arc<dyn ChatClient>,
    settings: EngineSettings,
    retry: RetryPolicy,
}

impl SearchEngine {
    pub fn new(client: Arc<dyn ChatClient>, settings: EngineSettings) -> Self {
        Self {
            client,
            settings,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Single attempt, for callers that manage retries themselves
    pub async fn search(&self, params: &SearchParams) -> Result<SearchOutcome, SearchError> {
        self.run(params, 1).await
    }

    /// Search with the configured number of attempts
    pub async fn search_with_retry(
        &self,
        params: &SearchParams,
    ) -> Result<SearchOutcome, SearchError> {
        self.run(params, self.settings.max_attempts).await
    }

    async fn run(
        &self,
        params: &SearchParams,
        max_attempts: u32,
    ) -> Result<SearchOutcome, SearchError> {
        let query = build_upstream_query(params);
        let messages = build_messages(&query);

        tracing::info!(
            query = %query.query,
            limit = query.max_results,
            language = query.filters.language.as_deref().unwrap_or("auto"),
            timeframe = query.filters.timeframe.as_deref().unwrap_or("any"),
            max_attempts,
            "search started"
        );

        let result = self.execute(&messages, params.limit(), max_attempts).await;

        match &result {
            Ok(outcome) => tracing::info!(
                query = %query.query,
                result_count = outcome.results.len(),
                total_cost = outcome.cost_info.as_ref().map(|c| c.cost.total_cost),
                "search completed"
            ),
            Err(e) => tracing::warn!(
                query = %query.query,
                kind = e.kind(),
                error = %e,
                "search failed"
            ),
        }

        result
    }

    async fn execute(
        &self,
        messages: &[ChatMessage],
        limit: u32,
        max_attempts: u32,
    ) -> Result<SearchOutcome, SearchError> {
        let completion = self
            .retry
            .execute_with_retry(move || self.request_completion(messages), max_attempts)
            .await?;

        let response = normalize_completion(&completion)?;
        if response.results.len() > limit as usize {
            tracing::debug!(
                returned = response.results.len(),
                limit,
                "model returned more results than requested, truncating"
            );
        }

        Ok(SearchOutcome {
            results: project_results(response.results, limit),
            cost_info: response.cost,
        })
    }

    async fn request_completion(
        &self,
        messages: &[ChatMessage],
    ) -> Result<ChatCompletion, SearchError> {
        self.client
            .send(
                &self.settings.model,
                messages,
                self.settings.temperature,
                self.settings.max_tokens,
            )
            .await
            .map_err(|failure| classify_error(&failure, self.settings.timeout_ms))
    }
}
