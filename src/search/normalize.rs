//! Turn a free-form completion into a [`SearchResponse`].
//!
//! Models like to wrap the requested JSON in prose or a fenced code block, so
//! the payload is located with a bracket-balance scan before parsing.

use crate::llm::ChatCompletion;
use crate::search::cost::calculate_cost;
use crate::search::{NormalizedResult, SearchError, SearchResponse};
use serde_json::Value;

/// Normalize a raw completion.
///
/// Entries missing `title` or `url` are kept (with a warning); filtering them
/// is the caller's decision.
pub fn normalize_completion(completion: &ChatCompletion) -> Result<SearchResponse, SearchError> {
    let content = completion
        .first_content()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| SearchError::Parse("completion contains no text content".into()))?;

    let payload = extract_json_object(content)?;

    let entries = payload
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Parse("response JSON has no \"results\" array".into()))?;

    let results: Vec<NormalizedResult> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let result = NormalizedResult::from_value(entry);
            if result.title.is_empty() || result.url.is_empty() {
                tracing::warn!(
                    index,
                    has_title = !result.title.is_empty(),
                    has_url = !result.url.is_empty(),
                    "search result entry is incomplete"
                );
            }
            result
        })
        .collect();

    let total_count = payload
        .get("totalCount")
        .and_then(Value::as_u64)
        .unwrap_or(results.len() as u64);

    let cost = completion
        .usage
        .map(|usage| calculate_cost(completion.model.as_deref().unwrap_or(""), &usage.into()));

    tracing::debug!(
        result_count = results.len(),
        total_count,
        has_cost = cost.is_some(),
        "completion normalized"
    );

    Ok(SearchResponse {
        results,
        total_count,
        cost,
    })
}

/// Find and parse the first balanced `{...}` span that is valid JSON.
fn extract_json_object(text: &str) -> Result<Value, SearchError> {
    let mut first_error: Option<String> = None;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        match balanced_span(text, start) {
            Some(end) => {
                match serde_json::from_str::<Value>(&text[start..end]) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        first_error.get_or_insert_with(|| e.to_string());
                    }
                }
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    Err(match first_error {
        Some(e) => SearchError::Parse(format!("response contains invalid JSON: {e}")),
        None => SearchError::Parse("response contains no JSON object".into()),
    })
}

/// End index (exclusive) of the object opening at `start`, if it closes.
///
/// Braces inside string literals do not count.
fn balanced_span(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
