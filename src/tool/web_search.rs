use crate::search::params::{DEFAULT_LIMIT, MAX_LIMIT, MAX_QUERY_CHARS, MIN_LIMIT};
use crate::search::{
    format_cost_info, Language, SearchEngine, SearchOutcome, SearchParams, Timeframe,
};
use crate::tool::base::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde_json::json;

/// Web search tool - answers queries through the LLM search engine
pub struct WebSearchTool {
    engine: SearchEngine,
}

impl WebSearchTool {
    pub fn new(engine: SearchEngine) -> Self {
        Self { engine }
    }
}

/// Render results as a numbered listing for the host
pub fn render_results(query: &str, outcome: &SearchOutcome) -> String {
    let mut output = String::new();

    if outcome.results.is_empty() {
        output.push_str(&format!("No results found for \"{query}\".\n"));
    } else {
        output.push_str(&format!(
            "Found {} results for \"{}\":\n\n",
            outcome.results.len(),
            query
        ));

        for (idx, item) in outcome.results.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", idx + 1, item.title));
            output.push_str(&format!("   URL: {}\n", item.url));
            if let Some(snippet) = &item.snippet {
                output.push_str(&format!("   Description: {snippet}\n"));
            }
            if let Some(date) = &item.published_date {
                output.push_str(&format!("   Date: {date}\n"));
            }
            if let Some(score) = item.relevance_score {
                output.push_str(&format!("   Relevance: {}%\n", relevance_percent(score)));
            }
            output.push('\n');
        }
    }

    if let Some(cost) = &outcome.cost_info {
        output.push_str("---\n");
        output.push_str(&format_cost_info(cost));
        output.push('\n');
    }

    output
}

/// Scores are expected in [0, 1]; larger values are taken as percentages already.
fn relevance_percent(score: f64) -> u32 {
    let percent = if score > 1.0 { score } else { score * 100.0 };
    percent.clamp(0.0, 100.0).round() as u32
}

#[async_trait]
impl Tool for WebSearchTool {
    fn id(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web and return relevant results with titles, URLs and descriptions. \
         \n\n\
         Usage notes:\n\
         - Results come from a language model acting as a search engine; verify important facts at the source\n\
         - Use limit to control how many results are returned (1-50)\n\
         - Use language to prefer results in a given language\n\
         - Use timeframe to prefer recent results (day, week, month, year)"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": MAX_QUERY_CHARS,
                    "description": "The search query"
                },
                "limit": {
                    "type": "integer",
                    "minimum": MIN_LIMIT,
                    "maximum": MAX_LIMIT,
                    "default": DEFAULT_LIMIT,
                    "description": "Maximum number of results to return"
                },
                "language": {
                    "type": "string",
                    "enum": Language::ALL.map(|l| l.as_str()),
                    "default": "auto",
                    "description": "Preferred result language"
                },
                "timeframe": {
                    "type": "string",
                    "enum": Timeframe::ALL.map(|t| t.as_str()),
                    "description": "Only include results from this recent period (optional)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params = SearchParams::from_value(params)?;

        let outcome = self.engine.search_with_retry(&params).await?;
        let output = render_results(params.query(), &outcome);

        let mut result = ToolResult::new(format!("Search: {}", params.query()), output)
            .with_metadata("query", json!(params.query()))
            .with_metadata("num_results", json!(outcome.results.len()));
        if let Some(cost) = &outcome.cost_info {
            result = result.with_metadata("cost", json!(cost));
        }

        Ok(result)
    }
}
