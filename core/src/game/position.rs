//! Board coordinates and facings

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Board width and height in cells.
pub const BOARD_SIZE: u16 = 32;

/// Number of cells on the board.
pub const CELL_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Ordered candidate directions handed to a move attempt.
pub type Directions = SmallVec<[Direction; 4]>;

/// One of the four facings, in the order used by the entity word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Left = 1,
    Down = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Decode the low two bits.
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Turns are addition modulo four: left is +1, around +2, right +3.
    fn turned(self, quarter_turns: u8) -> Self {
        Self::from_bits(self.bits().wrapping_add(quarter_turns))
    }

    pub fn left(self) -> Self {
        self.turned(1)
    }

    pub fn back(self) -> Self {
        self.turned(2)
    }

    pub fn right(self) -> Self {
        self.turned(3)
    }

    /// Replay-log symbol for a key press in this direction.
    pub fn symbol(self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Left => 'l',
            Direction::Down => 'd',
            Direction::Right => 'r',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'u' => Some(Direction::Up),
            'l' => Some(Direction::Left),
            'd' => Some(Direction::Down),
            'r' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A cell index in `0..1024`, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(u16);

impl Position {
    /// Build from a raw index, rejecting anything off the board.
    pub fn new(index: u16) -> Option<Self> {
        (usize::from(index) < CELL_COUNT).then_some(Self(index))
    }

    pub fn from_xy(x: u16, y: u16) -> Option<Self> {
        (x < BOARD_SIZE && y < BOARD_SIZE).then(|| Self(y * BOARD_SIZE + x))
    }

    /// Masks to ten bits; used where the index comes from an entity word.
    pub(crate) fn from_bits(bits: u16) -> Self {
        Self(bits & 0x03FF)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn x(self) -> u16 {
        self.0 % BOARD_SIZE
    }

    pub fn y(self) -> u16 {
        self.0 / BOARD_SIZE
    }

    /// The neighbouring cell, or `None` when the step leaves the board.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (x, y) = (self.x(), self.y());
        match direction {
            Direction::Up if y > 0 => Some(Self(self.0 - BOARD_SIZE)),
            Direction::Left if x > 0 => Some(Self(self.0 - 1)),
            Direction::Down if y + 1 < BOARD_SIZE => Some(Self(self.0 + BOARD_SIZE)),
            Direction::Right if x + 1 < BOARD_SIZE => Some(Self(self.0 + 1)),
            _ => None,
        }
    }

    /// Directions leading toward `target`, dominant axis first.
    ///
    /// Vertical wins ties. Axes with no distance to cover are omitted.
    pub fn seek(self, target: Position) -> Directions {
        let dx = i32::from(target.x()) - i32::from(self.x());
        let dy = i32::from(target.y()) - i32::from(self.y());

        let vertical = match dy.signum() {
            -1 => Some(Direction::Up),
            1 => Some(Direction::Down),
            _ => None,
        };
        let horizontal = match dx.signum() {
            -1 => Some(Direction::Left),
            1 => Some(Direction::Right),
            _ => None,
        };

        let ordered = if dy.abs() >= dx.abs() {
            [vertical, horizontal]
        } else {
            [horizontal, vertical]
        };
        ordered.into_iter().flatten().collect()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: u16, y: u16) -> Position {
        Position::from_xy(x, y).unwrap()
    }

    #[test]
    fn test_turns_wrap() {
        assert_eq!(Direction::Up.left(), Direction::Left);
        assert_eq!(Direction::Up.right(), Direction::Right);
        assert_eq!(Direction::Right.left(), Direction::Up);
        assert_eq!(Direction::Left.back(), Direction::Right);
        assert_eq!(Direction::Down.right(), Direction::Left);
    }

    #[test]
    fn test_step_stops_at_edges() {
        assert_eq!(at(0, 0).step(Direction::Up), None);
        assert_eq!(at(0, 0).step(Direction::Left), None);
        assert_eq!(at(31, 31).step(Direction::Down), None);
        assert_eq!(at(31, 31).step(Direction::Right), None);
        assert_eq!(at(31, 0).step(Direction::Down), Some(at(31, 1)));
        assert_eq!(at(5, 5).step(Direction::Left), Some(at(4, 5)));
    }

    #[test]
    fn test_new_rejects_off_board() {
        assert!(Position::new(1023).is_some());
        assert!(Position::new(1024).is_none());
        assert!(Position::from_xy(32, 0).is_none());
    }

    #[test]
    fn test_seek_prefers_dominant_axis() {
        let origin = at(10, 10);
        assert_eq!(
            origin.seek(at(12, 5)).as_slice(),
            &[Direction::Up, Direction::Right]
        );
        assert_eq!(
            origin.seek(at(4, 11)).as_slice(),
            &[Direction::Left, Direction::Down]
        );
        // ties go vertical
        assert_eq!(
            origin.seek(at(13, 13)).as_slice(),
            &[Direction::Down, Direction::Right]
        );
        assert_eq!(origin.seek(at(10, 3)).as_slice(), &[Direction::Up]);
        assert!(origin.seek(origin).is_empty());
    }
}
