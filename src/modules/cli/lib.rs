//! Portfolio server CLI
//!
//! This crate provides the command-line interface including:
//! - run: Start the server
//! - check: Verify the database connection and exit

pub mod commands;

pub use commands::{Cli, Commands};
