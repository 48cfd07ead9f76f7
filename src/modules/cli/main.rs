//! Portfolio server CLI
//!
//! Command-line entry point for the portfolio backend.

use clap::Parser;
use portfolio_cli::{Cli, Commands};
use portfolio_core::{AppConfig, LogFormat, PortfolioError};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PortfolioError> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    // Initialize logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    match config.server.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
    }

    // Execute command
    match cli.command {
        Commands::Run(cmd) => {
            cmd.execute(config).await?;
        }
        Commands::Check(cmd) => {
            cmd.execute(config).await?;
        }
    }

    Ok(())
}
