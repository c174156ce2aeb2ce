//! Entities and their static movement rules
//!
//! Every movable object (the protagonist, monsters, blocks) is a
//! [`Creature`]. Its wire form is a 16-bit word:
//!
//! ```text
//!   15 14 | 13 12 11 10 | 9 .. 0
//!   facing|    kind     | cell index
//! ```
//!
//! This module owns the pure tables: AI candidate orders, slide redirects,
//! and which tiles an entity may enter or leave. Anything that touches the
//! board lives in `movement`.

use super::position::{Direction, Directions, Position};
use super::rng::Rng;
use super::state::Inventory;
use super::tile::{MONSTER_BASE, Tile};

/// What an entity is. Discriminants are the four-bit kind code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CreatureKind {
    Bug = 0,
    Fireball = 1,
    PinkBall = 2,
    TankMoving = 3,
    Glider = 4,
    Teeth = 5,
    Walker = 6,
    Blob = 7,
    Paramecium = 8,
    TankStationary = 9,
    Block = 10,
    Chip = 11,
    ChipSliding = 13,
    Dead = 15,
}

impl CreatureKind {
    pub fn from_code(code: u8) -> Option<Self> {
        use CreatureKind::*;
        Some(match code {
            0 => Bug,
            1 => Fireball,
            2 => PinkBall,
            3 => TankMoving,
            4 => Glider,
            5 => Teeth,
            6 => Walker,
            7 => Blob,
            8 => Paramecium,
            9 => TankStationary,
            10 => Block,
            11 => Chip,
            13 => ChipSliding,
            15 => Dead,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_monster(self) -> bool {
        self.code() <= CreatureKind::TankStationary.code()
    }
}

/// A single entity.
///
/// `sliding` mirrors slip-roster membership for roster entities. For the
/// protagonist the flag travels with the `ChipSliding` kind instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Creature {
    pub direction: Direction,
    pub kind: CreatureKind,
    pub position: Position,
    pub sliding: bool,
}

impl Creature {
    pub fn new(direction: Direction, kind: CreatureKind, position: Position) -> Self {
        Self {
            direction,
            kind,
            position,
            sliding: false,
        }
    }

    /// Build the entity a board tile depicts.
    ///
    /// Clone-block tiles face opposite their low bits; stationary tank tiles
    /// come to life as moving tanks.
    pub fn from_tile(position: Position, tile: Tile) -> Self {
        let (direction, kind) = if tile.is_clone_block() {
            (tile.facing().back(), CreatureKind::Block)
        } else if tile == Tile::Block {
            (tile.facing(), CreatureKind::Block)
        } else {
            let code = tile.byte().wrapping_sub(MONSTER_BASE) / 4;
            let kind = match CreatureKind::from_code(code) {
                Some(CreatureKind::TankStationary) | None => CreatureKind::TankMoving,
                Some(kind) => kind,
            };
            (tile.facing(), kind)
        };
        Self::new(direction, kind, position)
    }

    /// Decode an entity word. Fails only on the two unused kind codes.
    pub fn from_bits(bits: u16) -> Option<Self> {
        let kind = CreatureKind::from_code(((bits >> 10) & 0x0F) as u8)?;
        Some(Self {
            direction: Direction::from_bits((bits >> 14) as u8),
            kind,
            position: Position::from_bits(bits),
            sliding: kind == CreatureKind::ChipSliding,
        })
    }

    pub fn bits(&self) -> u16 {
        (u16::from(self.direction.bits()) << 14)
            | (u16::from(self.kind.code()) << 10)
            | self.position.raw()
    }

    /// How this entity is drawn on the foreground layer.
    pub fn to_tile(&self) -> Tile {
        let facing = self.direction.bits();
        match self.kind {
            CreatureKind::Block => Tile::Block,
            CreatureKind::Chip | CreatureKind::ChipSliding | CreatureKind::Dead => {
                Tile::offset(Tile::ChipUp, facing)
            }
            CreatureKind::TankStationary => Tile::offset(Tile::TankUp, facing),
            kind => Tile::offset(Tile::BugUp, kind.code() * 4 + facing),
        }
    }

    pub fn is_chip(&self) -> bool {
        matches!(
            self.kind,
            CreatureKind::Chip | CreatureKind::ChipSliding | CreatureKind::Dead
        )
    }

    pub fn is_monster(&self) -> bool {
        self.kind.is_monster()
    }

    pub fn is_block(&self) -> bool {
        self.kind == CreatureKind::Block
    }

    pub fn is_tank(&self) -> bool {
        matches!(
            self.kind,
            CreatureKind::TankMoving | CreatureKind::TankStationary
        )
    }

    pub fn is_dead(&self) -> bool {
        self.kind == CreatureKind::Dead
    }

    pub fn is_sliding(&self) -> bool {
        self.kind == CreatureKind::ChipSliding || self.sliding
    }

    /// Kinds that keep the previous entity's direction when cloned or
    /// released from a trap.
    pub fn is_affected_by_clone_bug(&self) -> bool {
        matches!(
            self.kind,
            CreatureKind::Teeth | CreatureKind::Bug | CreatureKind::Paramecium
        )
    }

    pub fn kill(&mut self) {
        self.kind = CreatureKind::Dead;
    }

    /// AI candidate order for the current facing.
    ///
    /// Walkers draw one three-way permutation and blobs one four-way
    /// permutation per call; no other kind touches the generator.
    pub fn direction_priority(&self, chip: Position, rng: &mut Rng) -> Directions {
        let d = self.direction;
        if self.is_sliding() {
            return Directions::from_slice(&[d, d.back()]);
        }
        match self.kind {
            CreatureKind::Bug => Directions::from_slice(&[d.left(), d, d.right(), d.back()]),
            CreatureKind::Fireball => {
                Directions::from_slice(&[d, d.right(), d.left(), d.back()])
            }
            CreatureKind::PinkBall => Directions::from_slice(&[d, d.back()]),
            CreatureKind::Glider => Directions::from_slice(&[d, d.left(), d.right(), d.back()]),
            CreatureKind::Paramecium => {
                Directions::from_slice(&[d.right(), d, d.left(), d.back()])
            }
            CreatureKind::TankMoving => Directions::from_slice(&[d]),
            CreatureKind::Teeth => self.position.seek(chip),
            CreatureKind::Walker => {
                let mut turns = [d.left(), d.back(), d.right()];
                rng.permute3(&mut turns);
                let mut out = Directions::from_slice(&[d]);
                out.extend_from_slice(&turns);
                out
            }
            CreatureKind::Blob => {
                let mut turns = [d, d.left(), d.back(), d.right()];
                rng.permute4(&mut turns);
                Directions::from_slice(&turns)
            }
            _ => Directions::new(),
        }
    }

    /// Candidates for one forced step while standing on `tile`.
    pub fn slide_priority(&self, tile: Tile, rng: &mut Rng) -> Directions {
        let d = self.direction;
        if tile.is_ice() || (self.is_chip() && tile == Tile::Teleport) {
            let forward = apply_slide(d, tile, rng);
            let back = apply_slide(d.back(), tile, rng);
            Directions::from_slice(&[forward, back])
        } else if tile == Tile::Teleport {
            Directions::from_slice(&[d])
        } else {
            Directions::from_slice(&[apply_slide(d, tile, rng)])
        }
    }

    /// Whether leaving the current cell over `tile` in `direction` is allowed.
    ///
    /// `trap_open` reports whether a trap targeting this cell is released.
    pub fn can_leave(&self, direction: Direction, tile: Tile, trap_open: bool) -> bool {
        match tile {
            Tile::ThinWallUp => direction != Direction::Up,
            Tile::ThinWallRight => direction != Direction::Right,
            Tile::ThinWallDown => direction != Direction::Down,
            Tile::ThinWallLeft => direction != Direction::Left,
            Tile::ThinWallDownRight => {
                direction != Direction::Down && direction != Direction::Right
            }
            Tile::Trap => trap_open,
            _ => true,
        }
    }

    /// Whether `tile` admits this entity without side effects or pushing.
    pub fn can_enter(&self, direction: Direction, tile: Tile, inventory: &Inventory) -> bool {
        let chip = self.is_chip();
        let monster = self.is_monster();
        match tile {
            Tile::Floor | Tile::Water | Tile::Ice | Tile::Hint => true,
            Tile::ForceDown | Tile::ForceUp | Tile::ForceLeft | Tile::ForceRight => true,
            Tile::ButtonGreen | Tile::ButtonRed | Tile::ButtonBrown | Tile::ButtonBlue => true,
            Tile::ToggleOpen | Tile::Bomb | Tile::Trap => true,
            Tile::Wall | Tile::HiddenWallPerm | Tile::HiddenWallTemp => false,
            Tile::Block | Tile::BlueWallReal | Tile::OverlayBuffer | Tile::ToggleClosed => false,
            Tile::CloneMachine => false,
            Tile::CloneBlockUp
            | Tile::CloneBlockLeft
            | Tile::CloneBlockDown
            | Tile::CloneBlockRight => false,
            Tile::Chip | Tile::Dirt | Tile::BlueWallFake | Tile::Thief | Tile::PopUpWall => chip,
            Tile::Fire => !matches!(self.kind, CreatureKind::Bug | CreatureKind::Walker),
            Tile::ThinWallUp => direction != Direction::Down,
            Tile::ThinWallRight => direction != Direction::Left,
            Tile::ThinWallDown => direction != Direction::Up,
            Tile::ThinWallLeft => direction != Direction::Right,
            Tile::ThinWallDownRight => {
                direction == Direction::Down || direction == Direction::Right
            }
            Tile::Exit | Tile::Gravel | Tile::ForceRandom => !monster,
            Tile::DoorBlue => chip && inventory.keys[0] > 0,
            Tile::DoorRed => chip && inventory.keys[1] > 0,
            Tile::DoorGreen => chip && inventory.keys[2] > 0,
            Tile::DoorYellow => chip && inventory.keys[3] > 0,
            Tile::IceSouthEast => matches!(direction, Direction::Up | Direction::Left),
            Tile::IceNorthEast => matches!(direction, Direction::Down | Direction::Left),
            Tile::IceNorthWest => matches!(direction, Direction::Down | Direction::Right),
            Tile::IceSouthWest => matches!(direction, Direction::Up | Direction::Right),
            Tile::Socket => chip && inventory.chips_left <= 0,
            Tile::DrownedChip
            | Tile::BurnedChip
            | Tile::BombedChip
            | Tile::Unused36
            | Tile::Unused37
            | Tile::IceBlockStatic
            | Tile::ExitedChip
            | Tile::ExitExtra1
            | Tile::ExitExtra2 => false,
            Tile::KeyBlue
            | Tile::KeyRed
            | Tile::KeyGreen
            | Tile::KeyYellow
            | Tile::BootsWater
            | Tile::BootsFire
            | Tile::BootsIce
            | Tile::BootsSlide => !monster,
            Tile::SwimmingUp
            | Tile::SwimmingLeft
            | Tile::SwimmingDown
            | Tile::SwimmingRight
            | Tile::ChipUp
            | Tile::ChipLeft
            | Tile::ChipDown
            | Tile::ChipRight => !chip,
            // monsters and teleports
            _ => chip,
        }
    }
}

/// Redirect a facing by the terrain it slides over.
pub fn apply_slide(direction: Direction, tile: Tile, rng: &mut Rng) -> Direction {
    use Direction::*;
    match (tile, direction) {
        (Tile::ForceDown, _) => Down,
        (Tile::ForceUp, _) => Up,
        (Tile::ForceRight, _) => Right,
        (Tile::ForceLeft, _) => Left,
        (Tile::ForceRandom, _) => Direction::from_bits(rng.random4()),
        (Tile::IceSouthEast, Up) => Right,
        (Tile::IceSouthEast, Left) => Down,
        (Tile::IceNorthEast, Down) => Right,
        (Tile::IceNorthEast, Left) => Up,
        (Tile::IceNorthWest, Down) => Left,
        (Tile::IceNorthWest, Right) => Up,
        (Tile::IceSouthWest, Up) => Left,
        (Tile::IceSouthWest, Right) => Down,
        _ => direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: u16, y: u16) -> Position {
        Position::from_xy(x, y).unwrap()
    }

    #[test]
    fn test_word_layout() {
        let walker = Creature::new(Direction::Right, CreatureKind::Walker, at(3, 2));
        assert_eq!(walker.bits(), (3 << 14) | (6 << 10) | 67);
        assert_eq!(Creature::from_bits(walker.bits()), Some(walker));
    }

    #[test]
    fn test_from_bits_rejects_unused_codes() {
        assert!(Creature::from_bits(12 << 10).is_none());
        assert!(Creature::from_bits(14 << 10).is_none());
    }

    #[test]
    fn test_sliding_chip_word_sets_flag() {
        let chip = Creature::from_bits((13 << 10) | 5).unwrap();
        assert!(chip.sliding);
        assert!(chip.is_sliding());
    }

    #[test]
    fn test_tile_conversion() {
        let glider = Creature::from_tile(at(0, 0), Tile::GliderLeft);
        assert_eq!(glider.kind, CreatureKind::Glider);
        assert_eq!(glider.direction, Direction::Left);
        assert_eq!(glider.to_tile(), Tile::GliderLeft);

        let tank = Creature::from_tile(at(0, 0), Tile::TankDown);
        assert_eq!(tank.kind, CreatureKind::TankMoving);

        let block = Creature::from_tile(at(0, 0), Tile::CloneBlockUp);
        assert_eq!(block.kind, CreatureKind::Block);
        assert_eq!(block.direction, Direction::Up);
        assert_eq!(block.to_tile(), Tile::Block);

        let chip = Creature::new(Direction::Down, CreatureKind::ChipSliding, at(1, 1));
        assert_eq!(chip.to_tile(), Tile::ChipDown);
    }

    #[test]
    fn test_fixed_priority_tables() {
        let mut rng = Rng::new(7);
        let chip = at(0, 0);
        let make = |kind| Creature::new(Direction::Up, kind, at(5, 5));
        use Direction::*;
        assert_eq!(
            make(CreatureKind::Bug).direction_priority(chip, &mut rng).as_slice(),
            &[Left, Up, Right, Down]
        );
        assert_eq!(
            make(CreatureKind::Fireball).direction_priority(chip, &mut rng).as_slice(),
            &[Up, Right, Left, Down]
        );
        assert_eq!(
            make(CreatureKind::Paramecium).direction_priority(chip, &mut rng).as_slice(),
            &[Right, Up, Left, Down]
        );
        assert!(
            make(CreatureKind::TankStationary)
                .direction_priority(chip, &mut rng)
                .is_empty()
        );
        assert_eq!(rng.cursor(), 7);
    }

    #[test]
    fn test_blob_draws_once_and_permutes_all_four() {
        let mut rng = Rng::new(1);
        let blob = Creature::new(Direction::Up, CreatureKind::Blob, at(5, 5));
        let dirs = blob.direction_priority(at(0, 0), &mut rng);
        assert_eq!(rng.cursor(), 1_103_527_590);
        // permute4 of [F, L, B, R] with seed 1 yields indices [2, 3, 0, 1]
        assert_eq!(
            dirs.as_slice(),
            &[Direction::Down, Direction::Right, Direction::Up, Direction::Left]
        );
    }

    #[test]
    fn test_walker_keeps_forward_first() {
        let mut rng = Rng::new(1);
        let walker = Creature::new(Direction::Up, CreatureKind::Walker, at(5, 5));
        let dirs = walker.direction_priority(at(0, 0), &mut rng);
        // permute3 of [L, B, R] with seed 1 yields indices [2, 1, 0]
        assert_eq!(
            dirs.as_slice(),
            &[Direction::Up, Direction::Right, Direction::Down, Direction::Left]
        );
    }

    #[test]
    fn test_ice_corner_redirects() {
        let mut rng = Rng::new(0);
        assert_eq!(apply_slide(Direction::Up, Tile::IceSouthEast, &mut rng), Direction::Right);
        assert_eq!(apply_slide(Direction::Left, Tile::IceSouthEast, &mut rng), Direction::Down);
        assert_eq!(apply_slide(Direction::Down, Tile::IceNorthWest, &mut rng), Direction::Left);
        assert_eq!(apply_slide(Direction::Down, Tile::Ice, &mut rng), Direction::Down);
        assert_eq!(rng.cursor(), 0);
    }

    #[test]
    fn test_entry_rules() {
        let inventory = Inventory::default();
        let chip = Creature::new(Direction::Up, CreatureKind::Chip, at(1, 1));
        let bug = Creature::new(Direction::Up, CreatureKind::Bug, at(1, 1));
        let block = Creature::new(Direction::Up, CreatureKind::Block, at(1, 1));
        assert!(chip.can_enter(Direction::Up, Tile::Dirt, &inventory));
        assert!(!bug.can_enter(Direction::Up, Tile::Dirt, &inventory));
        assert!(!bug.can_enter(Direction::Up, Tile::Fire, &inventory));
        assert!(block.can_enter(Direction::Up, Tile::BootsFire, &inventory));
        assert!(!bug.can_enter(Direction::Up, Tile::BootsFire, &inventory));
        assert!(!chip.can_enter(Direction::Up, Tile::DoorRed, &inventory));
        assert!(bug.can_enter(Direction::Up, Tile::ChipLeft, &inventory));
        assert!(!chip.can_enter(Direction::Up, Tile::Socket, &Inventory {
            chips_left: 1,
            ..Inventory::default()
        }));
        assert!(!chip.can_leave(Direction::Down, Tile::ThinWallDownRight, false));
        assert!(!chip.can_leave(Direction::Up, Tile::Trap, false));
        assert!(chip.can_leave(Direction::Up, Tile::Trap, true));
    }
}
