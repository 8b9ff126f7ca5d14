//! Search orchestration against a scripted chat client

mod common;

use common::{completion, completion_with_usage, engine, results_json, ScriptedClient};
use llm_search::llm::UpstreamFailure;
use llm_search::search::engine::NO_TITLE;
use llm_search::search::{SearchError, SearchParams};
use std::time::{Duration, Instant};

fn params(query: &str, limit: i64) -> SearchParams {
    SearchParams::new(query, Some(limit), None, None).unwrap()
}

#[tokio::test]
async fn truncates_to_limit_preserving_order() {
    let client = ScriptedClient::replying(&results_json(10));
    let engine = engine(client.clone(), 3);

    let outcome = engine.search(&params("rust", 5)).await.unwrap();

    let titles: Vec<&str> = outcome.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Result 1", "Result 2", "Result 3", "Result 4", "Result 5"]);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn projects_fields_to_caller_shape() {
    let content = r#"{"results":[{"title":"Tokio","url":"https://tokio.rs","description":"Async runtime","date":"2024-05-01","score":0.97}]}"#;
    let engine = engine(ScriptedClient::replying(content), 1);

    let outcome = engine.search(&params("tokio", 10)).await.unwrap();
    let first = &outcome.results[0];
    assert_eq!(first.title, "Tokio");
    assert_eq!(first.url, "https://tokio.rs");
    assert_eq!(first.snippet.as_deref(), Some("Async runtime"));
    assert_eq!(first.published_date.as_deref(), Some("2024-05-01"));
    assert_eq!(first.relevance_score, Some(0.97));
}

#[tokio::test]
async fn empty_title_gets_placeholder_and_empty_url_is_kept() {
    let content = r#"{"results":[{"title":"","url":"https://a.example"},{"title":"No link","url":""}]}"#;
    let engine = engine(ScriptedClient::replying(content), 1);

    let outcome = engine.search(&params("q", 10)).await.unwrap();
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].title, NO_TITLE);
    assert_eq!(outcome.results[1].title, "No link");
    assert_eq!(outcome.results[1].url, "");
}

#[tokio::test]
async fn sends_configured_model_and_query() {
    let client = ScriptedClient::replying(&results_json(1));
    let engine = engine(client.clone(), 1);

    let p = SearchParams::new("rust gc", Some(4), Some("de"), Some("year")).unwrap();
    engine.search(&p).await.unwrap();

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let (model, messages) = &requests[0];
    assert_eq!(model, "gpt-4o-mini");
    let user = &messages.last().unwrap().content;
    assert!(user.contains("\"query\":\"rust gc\""));
    assert!(user.contains("\"language\":\"de\""));
    assert!(user.contains("\"timeframe\":\"year\""));
    assert!(user.contains("\"maxResults\":4"));
}

#[tokio::test]
async fn attaches_cost_info_from_usage() {
    let client =
        ScriptedClient::new(vec![Ok(completion_with_usage(&results_json(2), 1000, 500))]);
    let engine = engine(client, 1);

    let outcome = engine.search(&params("q", 10)).await.unwrap();
    let cost = outcome.cost_info.expect("usage should produce cost info");
    assert_eq!(cost.model, "gpt-4o-mini");
    assert_eq!(cost.usage.total_tokens, 1500);
    assert_eq!(cost.currency, "USD");
    // 1000 * 0.15 / 1e6 + 500 * 0.60 / 1e6
    assert_eq!(cost.cost.total_cost, 0.00045);
}

#[tokio::test]
async fn no_usage_means_no_cost_info() {
    let engine = engine(ScriptedClient::replying(&results_json(1)), 1);
    let outcome = engine.search(&params("q", 10)).await.unwrap();
    assert!(outcome.cost_info.is_none());
}

#[tokio::test]
async fn empty_result_list_is_success() {
    let engine = engine(ScriptedClient::replying(r#"{"results":[]}"#), 1);
    let outcome = engine.search(&params("q", 10)).await.unwrap();
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn prose_reply_is_parse_error_and_not_retried() {
    let client = ScriptedClient::replying("Sorry, I can't search the web.");
    let engine = engine(client.clone(), 3);

    let err = engine.search_with_retry(&params("q", 10)).await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn undecodable_completion_is_parse_error_and_not_retried() {
    let client = ScriptedClient::new(vec![Err(UpstreamFailure::decode(
        "Invalid completion payload: expected value at line 1 column 1",
    ))]);
    let engine = engine(client.clone(), 3);

    let err = engine.search_with_retry(&params("q", 10)).await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn retries_network_failures_then_succeeds() {
    let client = ScriptedClient::new(vec![
        Err(UpstreamFailure::api(502, "bad gateway")),
        Err(UpstreamFailure::transport(
            "ConnectionError",
            "Network error: connection refused",
        )),
        Ok(completion(&results_json(3))),
    ]);
    let engine = engine(client.clone(), 3);

    let outcome = engine.search_with_retry(&params("q", 10)).await.unwrap();
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn direct_search_does_not_retry() {
    let client = ScriptedClient::new(vec![
        Err(UpstreamFailure::api(503, "unavailable")),
        Ok(completion(&results_json(3))),
    ]);
    let engine = engine(client.clone(), 3);

    let err = engine.search(&params("q", 10)).await.unwrap_err();
    assert!(matches!(err, SearchError::Network(_)));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn auth_failure_fails_fast() {
    let client =
        ScriptedClient::new(vec![Err(UpstreamFailure::api(401, "Incorrect API key provided"))]);
    let engine = engine(client.clone(), 5);

    let err = engine.search_with_retry(&params("q", 10)).await.unwrap_err();
    assert!(matches!(err, SearchError::Auth(_)));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn rate_limit_honors_retry_after() {
    let client = ScriptedClient::new(vec![
        Err(UpstreamFailure::api(429, "slow down").with_retry_after("0.1")),
        Ok(completion(&results_json(1))),
    ]);
    let engine = engine(client.clone(), 2);

    let started = Instant::now();
    engine.search_with_retry(&params("q", 10)).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(100), "waited {elapsed:?}");
    assert!(elapsed < Duration::from_millis(200), "waited {elapsed:?}");
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn exhausted_retries_surface_last_error() {
    let client = ScriptedClient::new(vec![
        Err(UpstreamFailure::api(500, "first")),
        Err(UpstreamFailure::transport("TimeoutError", "Request timed out after 1000ms")),
    ]);
    let engine = engine(client.clone(), 3);

    let err = engine.search_with_retry(&params("q", 10)).await.unwrap_err();
    assert_eq!(err, SearchError::Timeout { timeout_ms: 1_000 });
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn concurrent_searches_are_independent() {
    let client = ScriptedClient::replying(&results_json(8));
    let engine = engine(client.clone(), 1);

    let p3 = params("three", 3);
    let p6 = params("six", 6);
    let (a, b) = tokio::join!(engine.search(&p3), engine.search(&p6));

    assert_eq!(a.unwrap().results.len(), 3);
    assert_eq!(b.unwrap().results.len(), 6);
    assert_eq!(client.calls(), 2);
}
