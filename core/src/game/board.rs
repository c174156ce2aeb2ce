//! Two-layer 32×32 board

use super::position::{CELL_COUNT, Position};
use super::tile::Tile;

/// Which of the two stacked layers a cell lookup addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// The active, visible layer.
    Foreground,
    /// The buried layer revealed when the foreground is popped.
    Background,
}

/// Foreground and background tile layers.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    foreground: Box<[Tile; CELL_COUNT]>,
    background: Box<[Tile; CELL_COUNT]>,
}

impl Board {
    pub fn new(foreground: [Tile; CELL_COUNT], background: [Tile; CELL_COUNT]) -> Self {
        Self {
            foreground: Box::new(foreground),
            background: Box::new(background),
        }
    }

    /// An all-floor board.
    pub fn empty() -> Self {
        Self::new([Tile::Floor; CELL_COUNT], [Tile::Floor; CELL_COUNT])
    }

    /// The tile on `layer` at `position`.
    pub fn peek(&self, layer: Layer, position: Position) -> Tile {
        self.layer(layer)[position.index()]
    }

    pub fn fg(&self, position: Position) -> Tile {
        self.peek(Layer::Foreground, position)
    }

    pub fn bg(&self, position: Position) -> Tile {
        self.peek(Layer::Background, position)
    }

    /// Overwrite the foreground of a cell, leaving what is buried alone.
    pub fn replace(&mut self, position: Position, tile: Tile) {
        self.foreground[position.index()] = tile;
    }

    /// Overwrite the buried tile of a cell.
    pub fn bury(&mut self, position: Position, tile: Tile) {
        self.background[position.index()] = tile;
    }

    /// Flip toggle doors on both layers of a cell.
    pub fn toggle(&mut self, position: Position) {
        let index = position.index();
        self.foreground[index] = self.foreground[index].toggled();
        self.background[index] = self.background[index].toggled();
    }

    /// Lift the foreground off a cell: the buried tile surfaces and floor
    /// is buried beneath it. Returns the new foreground.
    pub fn pop(&mut self, position: Position) -> Tile {
        let index = position.index();
        self.foreground[index] = self.background[index];
        self.background[index] = Tile::Floor;
        self.foreground[index]
    }

    /// Place `tile` on a cell, burying the current foreground.
    pub fn insert(&mut self, position: Position, tile: Tile) {
        let index = position.index();
        self.background[index] = self.foreground[index];
        self.foreground[index] = tile;
    }

    pub fn layer(&self, layer: Layer) -> &[Tile; CELL_COUNT] {
        match layer {
            Layer::Foreground => &self.foreground,
            Layer::Background => &self.background,
        }
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field(
                "occupied",
                &self.foreground.iter().filter(|t| **t != Tile::Floor).count(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_pop_restores_cell() {
        let mut board = Board::empty();
        let cell = Position::new(40).unwrap();
        board.replace(cell, Tile::Ice);

        board.insert(cell, Tile::ChipUp);
        assert_eq!(board.fg(cell), Tile::ChipUp);
        assert_eq!(board.bg(cell), Tile::Ice);
        assert_eq!(board.peek(Layer::Background, cell), Tile::Ice);

        assert_eq!(board.pop(cell), Tile::Ice);
        assert_eq!(board.bg(cell), Tile::Floor);
    }

    #[test]
    fn test_toggle_flips_both_layers() {
        let mut board = Board::empty();
        let cell = Position::new(77).unwrap();
        board.replace(cell, Tile::ChipLeft);
        board.bury(cell, Tile::ToggleClosed);

        board.toggle(cell);
        assert_eq!(board.fg(cell), Tile::ChipLeft);
        assert_eq!(board.bg(cell), Tile::ToggleOpen);

        board.pop(cell);
        board.toggle(cell);
        assert_eq!(board.fg(cell), Tile::ToggleClosed);
    }
}
