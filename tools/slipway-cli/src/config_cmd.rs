//! Config command - show the effective configuration

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use slipway_core::config::{self, Config};

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Read this config file instead of the platform default
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Write the effective configuration back to the platform config file
    #[arg(long)]
    pub write: bool,
}

/// Load an explicit config file, or the platform one with defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(config::load()),
    }
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let config = load(args.file.as_deref())?;

    match config::config_dir() {
        Some(dir) => println!("# config directory: {}", dir.display()),
        None => println!("# no config directory on this platform"),
    }
    let text = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{text}");

    if args.write {
        config::save(&config).context("Failed to save config")?;
        tracing::info!("Saved configuration");
    }
    Ok(())
}
