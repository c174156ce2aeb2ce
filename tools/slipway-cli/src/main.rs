//! Slipway CLI - headless driver for the simulation core
//!
//! # Commands
//!
//! - `slipway play` - Run a move string against a level and report the outcome
//! - `slipway inspect` - Decode a saved state and summarize it
//! - `slipway config` - Print the effective configuration
//!
//! # Usage
//!
//! ```bash
//! # Walk right twice, wait, then click toward (4,9)
//! slipway play level.json "rr-(4,9)" --save end.state
//!
//! # Look inside the saved state
//! slipway inspect end.state
//! ```

mod config_cmd;
mod inspect;
mod play;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Slipway CLI - headless driver for the simulation core
#[derive(Parser)]
#[command(name = "slipway")]
#[command(about = "Headless driver for the slipway tile-puzzle simulation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a move string against a level description
    Play(play::PlayArgs),

    /// Decode a saved state file and print a summary
    Inspect(inspect::InspectArgs),

    /// Print the effective configuration as TOML
    Config(config_cmd::ConfigArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Config(args) => config_cmd::execute(args),
    }
}
