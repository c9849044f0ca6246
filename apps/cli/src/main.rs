//! ContentHub CLI: drive the partner content workshop from the terminal.
//!
//! Creates projects from URLs or text, runs translation and social-post
//! generation, and manages the News Distributor and crypto news feeds.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
