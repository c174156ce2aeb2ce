//! Level descriptions
//!
//! A [`LevelDescription`] is what a level loader hands the engine: both
//! layers, the starting entities, and the connection tables. It is
//! immutable for the lifetime of a [`Game`](super::Game).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::creature::{Creature, CreatureKind};
use super::position::{CELL_COUNT, Direction, Position};
use super::tile::Tile;

/// Errors raised while validating a level description.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("{layer} layer has {len} cells, expected 1024")]
    LayerSize { layer: &'static str, len: usize },

    #[error("{what} refers to cell {index}, outside the board")]
    CellOutOfRange { what: &'static str, index: u16 },

    #[error("{what} word {word:#06x} uses an unassigned entity kind")]
    InvalidEntity { what: &'static str, word: u16 },
}

/// Which parity of full ticks teeth and blobs act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Even,
    Odd,
}

/// A button wired to the cell it controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub button: Position,
    pub target: Position,
}

/// Everything a loader supplies to start a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    #[serde(default)]
    pub number: u16,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub hint: String,
    /// Seconds on the clock; zero means untimed.
    #[serde(default)]
    pub time_limit: u16,
    #[serde(default)]
    pub chips_required: i16,
    pub foreground: Vec<Tile>,
    pub background: Vec<Tile>,
    /// Starting protagonist as an entity word.
    pub protagonist: u16,
    /// Initial roster as entity words, in tie-break order.
    #[serde(default)]
    pub roster: Vec<u16>,
    #[serde(default)]
    pub trap_connections: Vec<Connection>,
    #[serde(default)]
    pub clone_connections: Vec<Connection>,
    /// Teleport cells in board order.
    #[serde(default)]
    pub teleports: Vec<Position>,
    #[serde(default)]
    pub rng_seed: u32,
    #[serde(default)]
    pub step: Step,
}

impl LevelDescription {
    /// Build a description from raw layers the way a `.dat` loader would.
    ///
    /// The protagonist is the last protagonist tile in board order, the
    /// roster is every listed monster position not sitting on a clone
    /// machine, and teleports are collected from both layers.
    pub fn from_layers(
        foreground: Vec<Tile>,
        background: Vec<Tile>,
        monster_positions: &[Position],
    ) -> Result<Self, LevelError> {
        check_layer("foreground", &foreground)?;
        check_layer("background", &background)?;

        let protagonist = (0..CELL_COUNT)
            .rev()
            .find(|&i| foreground[i].is_chip())
            .and_then(|i| Position::new(i as u16))
            .map(|position| {
                Creature::new(foreground[position.index()].facing(), CreatureKind::Chip, position)
            })
            .unwrap_or_else(|| {
                Creature::new(
                    Direction::Down,
                    CreatureKind::Chip,
                    Position::from_bits(0),
                )
            });

        let roster = monster_positions
            .iter()
            .filter(|p| {
                foreground[p.index()].is_monster() && background[p.index()] != Tile::CloneMachine
            })
            .map(|&p| Creature::from_tile(p, foreground[p.index()]).bits())
            .collect();

        let teleports = (0..CELL_COUNT)
            .filter(|&i| {
                foreground[i] == Tile::Teleport
                    || (foreground[i].is_monster() && background[i] == Tile::Teleport)
            })
            .filter_map(|i| Position::new(i as u16))
            .collect();

        Ok(Self {
            number: 0,
            title: String::new(),
            password: String::new(),
            hint: String::new(),
            time_limit: 0,
            chips_required: 0,
            foreground,
            background,
            protagonist: protagonist.bits(),
            roster,
            trap_connections: Vec::new(),
            clone_connections: Vec::new(),
            teleports,
            rng_seed: 0,
            step: Step::Even,
        })
    }

    /// Check sizes and every cell reference.
    pub fn validate(&self) -> Result<(), LevelError> {
        check_layer("foreground", &self.foreground)?;
        check_layer("background", &self.background)?;

        let connections = self
            .trap_connections
            .iter()
            .chain(&self.clone_connections)
            .flat_map(|c| [c.button, c.target]);
        for position in connections.chain(self.teleports.iter().copied()) {
            check_cell("connection", position.raw())?;
        }
        Ok(())
    }
}

fn check_layer(layer: &'static str, tiles: &[Tile]) -> Result<(), LevelError> {
    if tiles.len() != CELL_COUNT {
        return Err(LevelError::LayerSize {
            layer,
            len: tiles.len(),
        });
    }
    Ok(())
}

fn check_cell(what: &'static str, index: u16) -> Result<(), LevelError> {
    if usize::from(index) >= CELL_COUNT {
        return Err(LevelError::CellOutOfRange { what, index });
    }
    Ok(())
}

/// Immutable per-level tables consulted during ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelData {
    pub number: u16,
    pub title: String,
    pub time_limit: u16,
    pub chips_required: i16,
    pub rng_seed: u32,
    pub step: Step,
    pub trap_connections: Vec<Connection>,
    pub clone_connections: Vec<Connection>,
    pub teleports: Vec<Position>,
    /// Toggle doors, listed once per layer holding one.
    pub toggle_doors: Vec<Position>,
}

impl LevelData {
    pub(crate) fn from_description(description: &LevelDescription) -> Self {
        let mut toggle_doors = Vec::new();
        for i in 0..CELL_COUNT {
            let Some(position) = Position::new(i as u16) else {
                continue;
            };
            if description.foreground[i].is_toggle() {
                toggle_doors.push(position);
            }
            if description.background[i].is_toggle() {
                toggle_doors.push(position);
            }
        }

        Self {
            number: description.number,
            title: description.title.clone(),
            time_limit: description.time_limit,
            chips_required: description.chips_required,
            rng_seed: description.rng_seed,
            step: description.step,
            trap_connections: description.trap_connections.clone(),
            clone_connections: description.clone_connections.clone(),
            teleports: description.teleports.clone(),
            toggle_doors,
        }
    }

    /// Timer value before any time has elapsed; untimed levels start at -2.
    pub fn start_time(&self) -> i32 {
        if self.time_limit == 0 {
            -2
        } else {
            i32::from(self.time_limit) * 10 + 9
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Vec<Tile> {
        vec![Tile::Floor; CELL_COUNT]
    }

    #[test]
    fn test_from_layers_finds_last_protagonist() {
        let mut fg = blank();
        let mut bg = blank();
        fg[10] = Tile::ChipDown;
        fg[900] = Tile::ChipLeft;
        fg[50] = Tile::BugRight;
        fg[60] = Tile::GliderUp;
        bg[60] = Tile::CloneMachine;
        fg[70] = Tile::Teleport;
        fg[80] = Tile::TankUp;
        bg[80] = Tile::Teleport;

        let monsters = [50, 60, 10]
            .map(|i| Position::new(i).unwrap());
        let level = LevelDescription::from_layers(fg, bg, &monsters).unwrap();

        let chip = Creature::from_bits(level.protagonist).unwrap();
        assert_eq!(chip.position.raw(), 900);
        assert_eq!(chip.direction, Direction::Left);

        assert_eq!(level.roster.len(), 1);
        let bug = Creature::from_bits(level.roster[0]).unwrap();
        assert_eq!(bug.kind, CreatureKind::Bug);
        assert_eq!(bug.direction, Direction::Right);

        let teleports: Vec<u16> = level.teleports.iter().map(|p| p.raw()).collect();
        assert_eq!(teleports, vec![70, 80]);
    }

    #[test]
    fn test_validate_rejects_short_layer() {
        let mut level = LevelDescription::from_layers(blank(), blank(), &[]).unwrap();
        level.background.pop();
        assert_eq!(
            level.validate(),
            Err(LevelError::LayerSize {
                layer: "background",
                len: CELL_COUNT - 1
            })
        );
    }

    #[test]
    fn test_toggle_doors_listed_per_layer() {
        let mut level = LevelDescription::from_layers(blank(), blank(), &[]).unwrap();
        level.foreground[3] = Tile::ToggleOpen;
        level.background[3] = Tile::ToggleClosed;
        level.background[7] = Tile::ToggleOpen;
        let data = LevelData::from_description(&level);
        let cells: Vec<u16> = data.toggle_doors.iter().map(|p| p.raw()).collect();
        assert_eq!(cells, vec![3, 3, 7]);
    }

    #[test]
    fn test_start_time() {
        let mut level = LevelDescription::from_layers(blank(), blank(), &[]).unwrap();
        assert_eq!(LevelData::from_description(&level).start_time(), -2);
        level.time_limit = 100;
        assert_eq!(LevelData::from_description(&level).start_time(), 1009);
    }

    #[test]
    fn test_json_round_trip() {
        let level = LevelDescription::from_layers(blank(), blank(), &[]).unwrap();
        let json = serde_json::to_string(&level).unwrap();
        let back: LevelDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, level);
    }
}
