// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use prodreg::Config;
use tracing::debug;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Merge command-line overrides into the loaded configuration
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    if let Some(root) = &cli.root {
        config.root = Some(root.clone());
    }
    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    debug!("Using configuration: {:?}", config);

    match cli.command {
        Commands::Status { text } => commands::cmd_status(&config, text),
        Commands::ListExtensions { json } => commands::cmd_list_extensions(&config, json),
        Commands::Products => commands::cmd_products(&config),
    }
}
