//! Binary crate for the `weatherbot` command.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - A console host that stands in for the chat platform
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod console;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cmd = cli::Cli::parse();
    cmd.run().await
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
