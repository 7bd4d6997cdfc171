use anyhow::Result;
use slack_mcp::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file before anything else (silently ignore if missing)
    dotenvy::dotenv().ok();

    cli::run().await
}
