//! Slipway Core - deterministic tile-puzzle simulation
//!
//! This crate provides a half-tick simulation of the MS tile-puzzle ruleset
//! with bit-exact savestates and a branching history of recorded moves.
//!
//! # Architecture
//!
//! - [`Game`] - One level in progress, advanced by [`Game::tick`]
//! - [`codec`] - Versioned binary form of a live state, flat or run-length
//! - [`History`] - Tree of recorded states with rewind, replay and slots
//! - [`Session`] - A game and its history kept in step
//! - [`config`] - User settings stored as TOML

pub mod codec;
pub mod config;
pub mod game;
pub mod history;
pub mod session;

// Re-export core types
pub use codec::{CodecError, Form};
pub use config::{Config, ConfigError, EngineConfig, HistoryConfig, PlaybackConfig};
pub use game::{
    ClickOffset, ClickOrder, Creature, CreatureKind, Direction, Game, GameState, Inventory,
    LevelDescription, LevelError, Move, MoveParseError, Position, Tile,
};
pub use history::History;
pub use session::Session;
