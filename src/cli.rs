use crate::config::{self, Config};
use crate::llm::OpenAiClient;
use crate::search::{EngineSettings, SearchEngine, SearchError, SearchOutcome, SearchParams};
use crate::tool::web_search::render_results;
use crate::tool::ToolRegistry;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::future::join_all;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "llm-search")]
#[command(version, about = "Web search answered by an LLM chat endpoint", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/llm-search/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one or more searches (concurrently) and print the results.
    Search(SearchCmd),
    /// Print the search tool definition (name, description, input schema) as JSON.
    Schema,
}

#[derive(Args, Debug)]
struct SearchCmd {
    /// Query (repeatable: every positional argument is a separate search).
    #[arg(required = true)]
    queries: Vec<String>,
    /// Maximum number of results per query (1-50, default 10).
    #[arg(long)]
    limit: Option<i64>,
    /// Preferred result language (auto, en, zh, ja, ko, es, fr, de, ru, pt).
    #[arg(long)]
    language: Option<String>,
    /// Recency filter (day, week, month, year).
    #[arg(long)]
    timeframe: Option<String>,
    /// Make a single attempt per query instead of retrying transient failures.
    #[arg(long)]
    no_retry: bool,
    /// Print results as JSON instead of the text listing.
    #[arg(long)]
    json: bool,
}

/// CLI entry point
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Schema => print_schema(),
        Commands::Search(cmd) => {
            let config = config::load_config(cli.config.as_deref())?;
            let _log_guard = crate::logging::init(&config)?;
            tracing::debug!(?config, "configuration loaded");
            run_search(&config, cmd).await
        }
    }
}

fn print_schema() -> Result<()> {
    // The schema does not depend on credentials; defaults are enough.
    let registry = ToolRegistry::new(build_engine(&Config::default())?);
    let definitions = registry.list_tool_definitions();
    println!(
        "{}",
        serde_json::to_string_pretty(&definitions).context("Failed to serialize tool schema")?
    );
    Ok(())
}

fn build_engine(config: &Config) -> Result<SearchEngine> {
    let client = OpenAiClient::from_config(config)?;
    Ok(SearchEngine::new(
        Arc::new(client),
        EngineSettings::from_config(config),
    ))
}

async fn run_search(config: &Config, cmd: SearchCmd) -> Result<()> {
    // Validate everything before the first network call.
    let params: Vec<SearchParams> = cmd
        .queries
        .iter()
        .map(|q| {
            SearchParams::new(q, cmd.limit, cmd.language.as_deref(), cmd.timeframe.as_deref())
        })
        .collect::<Result<_, SearchError>>()?;

    let engine = build_engine(config)?;
    let no_retry = cmd.no_retry;

    let searches = params.iter().map(|p| {
        let engine = &engine;
        async move {
            if no_retry {
                engine.search(p).await
            } else {
                engine.search_with_retry(p).await
            }
        }
    });
    let outcomes: Vec<Result<SearchOutcome, SearchError>> = join_all(searches).await;

    let mut failed = 0usize;
    if cmd.json {
        let entries: Vec<serde_json::Value> = params
            .iter()
            .zip(&outcomes)
            .map(|(p, outcome)| match outcome {
                Ok(outcome) => json!({ "query": p.query(), "outcome": outcome }),
                Err(e) => {
                    failed += 1;
                    json!({
                        "query": p.query(),
                        "error": { "kind": e.kind(), "message": e.to_string() },
                    })
                }
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialize results")?
        );
    } else {
        for (p, outcome) in params.iter().zip(&outcomes) {
            match outcome {
                Ok(outcome) => print!("{}", render_results(p.query(), outcome)),
                Err(e) => {
                    failed += 1;
                    println!("Search failed: {e}");
                }
            }
            println!();
        }
    }

    if failed > 0 {
        bail!("{failed} of {} searches failed", params.len());
    }
    Ok(())
}
