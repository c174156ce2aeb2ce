//! Mutable simulation state
//!
//! [`GameState`] is exactly what the state codec persists. Everything a
//! tick can change lives here; immutable level tables live in
//! [`LevelData`](super::level::LevelData).

use super::board::Board;
use super::creature::Creature;
use super::position::Position;
use super::rng::Rng;
use super::roster::{Roster, SlipRoster};

/// Collected items and the chip counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Chips still needed before the socket opens; may go negative.
    pub chips_left: i16,
    /// Blue, red, green, yellow.
    pub keys: [u16; 4],
    /// Water, fire, ice, suction.
    pub boots: [bool; 4],
}

impl Inventory {
    pub const WATER: usize = 0;
    pub const FIRE: usize = 1;
    pub const ICE: usize = 2;
    pub const SUCTION: usize = 3;
}

/// Open/closed flags for each trap connection, one bit per connection.
///
/// Stored as little-endian bytes with trailing zero bytes trimmed, which is
/// also its wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrapSet {
    bytes: Vec<u8>,
}

impl TrapSet {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut set = Self {
            bytes: bytes.to_vec(),
        };
        set.trim();
        set
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.bytes
            .get(index / 8)
            .is_some_and(|byte| byte & (1 << (index % 8)) != 0)
    }

    pub fn set(&mut self, index: usize, open: bool) {
        let byte = index / 8;
        if open {
            if self.bytes.len() <= byte {
                self.bytes.resize(byte + 1, 0);
            }
            self.bytes[byte] |= 1 << (index % 8);
        } else if let Some(slot) = self.bytes.get_mut(byte) {
            *slot &= !(1 << (index % 8));
            self.trim();
        }
    }

    fn trim(&mut self) {
        while self.bytes.last() == Some(&0) {
            self.bytes.pop();
        }
    }
}

/// The complete live state of a level in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub protagonist: Creature,
    pub roster: Roster,
    pub slip: SlipRoster,
    pub inventory: Inventory,
    pub rng: Rng,
    /// Half-ticks elapsed since the level started.
    pub tick: u16,
    /// Click target still being walked toward.
    pub click: Option<Position>,
    pub traps: TrapSet,
}

impl GameState {
    /// Re-derive every roster entity's sliding flag from slip membership.
    pub fn sync_sliding(&mut self) {
        for creature in self.roster.iter_mut() {
            creature.sliding = false;
        }
        for &index in self.slip.indices() {
            self.roster.get_mut(index).sliding = true;
        }
    }
}
