use anyhow::Result;
use booking_agent::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
