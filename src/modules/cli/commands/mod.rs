//! CLI commands

mod check;
mod run;

pub use check::CheckCommand;
pub use run::RunCommand;

use clap::{Parser, Subcommand};

/// Portfolio server - contacts, users and projects over MongoDB
#[derive(Parser, Debug)]
#[command(name = "portfolio-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Run(RunCommand),

    /// Connect to the configured database, ping it and exit
    Check(CheckCommand),
}
