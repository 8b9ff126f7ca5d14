use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    llm_search::cli::run().await
}
