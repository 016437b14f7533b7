//! refill
//!
//! Command-line driver for the gift-card purchase session.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refill_cli::{load_context, run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refill_session=info,refill_storage=info,refill_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let (handles, catalog) = load_context(&cli)?;

    let output = run(&cli.command, &handles, &catalog).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
