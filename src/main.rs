mod cli;
mod config;
mod error;
mod export;
mod graph;
mod panel;
mod search;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - only show warnings by default, use RUST_LOG=info for more detail
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let data = cli.data.as_deref();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(force, config).await?;
        }
        Commands::Show { node } => {
            cli::commands::show::run(data, config, &node).await?;
        }
        Commands::Edge { from, to, id } => {
            cli::commands::edge::run(data, config, from, to, id).await?;
        }
        Commands::Search { query, html } => {
            cli::commands::search::run(data, config, &query, html).await?;
        }
        Commands::Stats => {
            cli::commands::stats::run(data, config).await?;
        }
        Commands::Validate { strict } => {
            cli::commands::validate::run(data, config, strict).await?;
        }
        Commands::Viz { output, open } => {
            cli::commands::viz::run(data, config, output, open).await?;
        }
        Commands::Export { format, output } => {
            cli::commands::export::run(data, config, format, output).await?;
        }
    }

    Ok(())
}
