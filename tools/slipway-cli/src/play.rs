//! Play command - run a move string against a level
//!
//! Loads a JSON level description, plays every move through a session
//! (recording history as it goes), prints the final status and optionally
//! writes the encoded final state.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use slipway_core::codec::{self, Form};
use slipway_core::{Game, LevelDescription, Move, Session};

use crate::config_cmd;

/// Arguments for the play command
#[derive(Args)]
pub struct PlayArgs {
    /// Level description (JSON)
    pub level: PathBuf,

    /// Moves: u l d r for keys, - for wait, (x,y) for a click
    pub moves: String,

    /// Write the encoded final state to this file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Write the saved state run-length compressed
    #[arg(long)]
    pub compress: bool,

    /// Read this config file instead of the platform default
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Execute the play command
pub fn execute(args: PlayArgs) -> Result<()> {
    let config = config_cmd::load(args.config.as_deref())?;
    let level = load_level(&args.level)?;
    let moves = Move::parse_sequence(&args.moves).context("Invalid move string")?;

    let mut session = Session::new(&level, &config)
        .with_context(|| format!("Invalid level: {}", args.level.display()))?;

    let played = session.play_all(&moves);
    if played < moves.len() {
        tracing::info!("Protagonist is gone after {} of {} moves", played, moves.len());
    }

    print_status(session.game(), session.history().moves().len());

    if let Some(path) = &args.save {
        let form = if args.compress { Form::Rle } else { Form::Flat };
        let bytes = codec::encode(session.game().state(), form);
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write state: {}", path.display()))?;
        tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    }

    Ok(())
}

fn load_level(path: &Path) -> Result<LevelDescription> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read level: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse level: {}", path.display()))
}

fn print_status(game: &Game, recorded: usize) {
    let chip = game.protagonist();
    let outcome = if game.is_completed() {
        "complete"
    } else if game.is_dead() {
        "dead"
    } else {
        "alive"
    };
    let level = game.level();

    println!("level:     {} {}", level.number, level.title);
    println!("tick:      {}", game.tick_count());
    println!("timer:     {}", game.time_remaining());
    println!("position:  {}", chip.position);
    println!("chips:     {}", game.inventory().chips_left);
    println!("recorded:  {recorded} half-ticks");
    println!("outcome:   {outcome}");
}
