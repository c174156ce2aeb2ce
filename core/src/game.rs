//! Simulation
//!
//! A deterministic half-tick simulation of one level. Given the same level
//! and the same input sequence, every tick produces the same state.

mod board;
mod creature;
mod engine;
mod level;
mod movement;
mod moves;
mod position;
mod rng;
mod roster;
mod state;
mod tile;


pub use board::{Board, Layer};
pub use creature::{Creature, CreatureKind};
pub use engine::{ClickOrder, Game};
pub use level::{Connection, LevelData, LevelDescription, LevelError, Step};
pub use moves::{ClickOffset, Move, MoveFlags, MoveParseError};
pub use position::{BOARD_SIZE, CELL_COUNT, Direction, Directions, Position};
pub use rng::Rng;
pub use roster::{Roster, SlipRoster};
pub use state::{GameState, Inventory, TrapSet};
pub use tile::Tile;
