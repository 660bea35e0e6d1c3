//! Development tasks for the battle rule engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo run -p xtask -- <command>`

mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Simulate, Tags};

/// Development tasks for the battle rule engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for battle content", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load and validate a data directory
    Check(Check),

    /// Dump the parsed tags of one source as JSON
    Tags(Tags),

    /// Run queries from a RON scenario file
    Simulate(Simulate),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check(cmd) => cmd.execute(),
        Command::Tags(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
    }
}
