//! pressroom CLI - migration runner and development tooling.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.global.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        cli::Commands::Migrate(args) => commands::migrate::execute(args, &cli.global).await,
        cli::Commands::Seed => commands::seed::execute(&cli.global).await,
    }
}
