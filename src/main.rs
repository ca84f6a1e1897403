//! Teamtailor source CLI
//!
//! Protocol messages go to stdout; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use source_teamtailor::cli::{Cli, Runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Runner::new(cli).run().await.context("source-teamtailor failed")
}
