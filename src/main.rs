//! noirfeed - Illustrated Hacker News best stories
//!
//! Prints a JSON document with the top stories and a generated illustration
//! for each. Logs go to stderr so stdout carries only the document.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use noirfeed::cli::Cli;
use noirfeed::feed::{Feed, FeedResponse};

/// Initializes logging to stderr, honouring `RUST_LOG` when set
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("noirfeed=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.to_config();
    config.ensure_directories();

    let stories = Feed::new(&config)?.render().await;
    tracing::info!(count = stories.len(), "feed rendered");
    let response = FeedResponse::new(stories);

    let output = if cli.compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };
    println!("{}", output);

    Ok(())
}
