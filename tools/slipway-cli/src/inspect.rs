//! Inspect command - summarize a saved state file

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use slipway_core::codec;
use slipway_core::game::GameState;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Encoded state file (flat or run-length)
    pub state: PathBuf,

    /// List every roster entity
    #[arg(long)]
    pub roster: bool,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.state)
        .with_context(|| format!("Failed to read state: {}", args.state.display()))?;
    let state = codec::decode(&bytes)
        .with_context(|| format!("Failed to decode state: {}", args.state.display()))?;

    let form = match bytes.first() {
        Some(&codec::RLE) => "run-length",
        _ => "flat",
    };
    println!("encoding:  {form}, {} bytes", bytes.len());
    print_summary(&state, args.roster);
    Ok(())
}

fn print_summary(state: &GameState, list_roster: bool) {
    let chip = &state.protagonist;
    let inventory = &state.inventory;
    let boots: Vec<&str> = ["water", "fire", "ice", "suction"]
        .into_iter()
        .zip(inventory.boots)
        .filter_map(|(name, held)| held.then_some(name))
        .collect();

    println!("tick:      {}", state.tick);
    println!(
        "chip:      {:?} facing {:?} at {}",
        chip.kind, chip.direction, chip.position
    );
    println!("chips:     {}", inventory.chips_left);
    println!("keys:      {:?}", inventory.keys);
    println!("boots:     {}", boots.join(", "));
    println!("rng:       {:#010x}", state.rng.cursor());
    match state.click {
        Some(target) => println!("click:     {target}"),
        None => println!("click:     none"),
    }
    println!("traps:     {:02x?}", state.traps.as_bytes());
    println!(
        "roster:    {} entities, {} sliding",
        state.roster.len(),
        state.slip.len()
    );

    if list_roster {
        for (i, creature) in state.roster.iter().enumerate() {
            let sliding = if creature.sliding { " (sliding)" } else { "" };
            println!(
                "  {i:>4}  {:?} facing {:?} at {}{sliding}",
                creature.kind, creature.direction, creature.position
            );
        }
    }
}
