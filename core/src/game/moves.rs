//! Input symbols and move outcomes

use thiserror::Error;

use super::position::{Direction, Position};

bitflags::bitflags! {
    /// Outcome of one move attempt
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MoveFlags: u8 {
        /// The entity left its cell
        const MOVED = 0b0000_0001;
        /// The entity died entering the cell (always paired with MOVED)
        const DIED = 0b0000_0010;
        /// The entered terrain keeps the entity moving
        const SLIDING = 0b0000_0100;
        /// A green button was pressed
        const GREEN = 0b0000_1000;
        /// A red button was pressed
        const RED = 0b0001_0000;
        /// A brown button was pressed
        const BROWN = 0b0010_0000;
        /// A blue button was pressed
        const BLUE = 0b0100_0000;
        /// The entity stepped onto a teleport
        const PORTAL = 0b1000_0000;
    }
}

impl MoveFlags {
    pub const FAIL: MoveFlags = MoveFlags::empty();
    pub const SUCCESS: MoveFlags = MoveFlags::MOVED;
    pub const SLIDE: MoveFlags = MoveFlags::MOVED.union(MoveFlags::SLIDING);
    pub const DEATH: MoveFlags = MoveFlags::MOVED.union(MoveFlags::DIED);

    pub const BUTTONS: MoveFlags = MoveFlags::GREEN
        .union(MoveFlags::RED)
        .union(MoveFlags::BROWN)
        .union(MoveFlags::BLUE);

    /// `SUCCESS` when `allowed`, otherwise `FAIL`.
    pub fn moved_if(allowed: bool) -> MoveFlags {
        if allowed { MoveFlags::SUCCESS } else { MoveFlags::FAIL }
    }

    pub fn moved(self) -> bool {
        self.contains(MoveFlags::MOVED)
    }
}

/// One half-tick of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// No key held.
    Wait,
    /// A directional key.
    Key(Direction),
    /// A screen click on a target cell.
    Click(Position),
}

/// Why a move string could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("unknown move symbol '{0}'")]
    UnknownSymbol(char),
    #[error("click '({0}' is missing its closing parenthesis")]
    UnclosedClick(String),
    #[error("malformed click '({0})', expected (x,y)")]
    MalformedClick(String),
    #[error("bad click coordinate '{0}'")]
    BadCoordinate(String),
    #[error("click ({x},{y}) is off the board")]
    OffBoard { x: u16, y: u16 },
}

impl Move {
    /// Parse a move string: `u l d r -` and clicks written `(x,y)`.
    pub fn parse_sequence(text: &str) -> Result<Vec<Move>, MoveParseError> {
        let mut moves = Vec::new();
        let mut chars = text.chars();
        while let Some(symbol) = chars.next() {
            match symbol {
                '-' | '_' => moves.push(Move::Wait),
                c if c.is_whitespace() => {}
                '(' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ')' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        return Err(MoveParseError::UnclosedClick(body));
                    }
                    moves.push(Move::Click(parse_click(&body)?));
                }
                c => {
                    let direction = Direction::from_symbol(c.to_ascii_lowercase())
                        .ok_or(MoveParseError::UnknownSymbol(c))?;
                    moves.push(Move::Key(direction));
                }
            }
        }
        Ok(moves)
    }
}

fn parse_click(body: &str) -> Result<Position, MoveParseError> {
    let (x, y) = body
        .split_once(',')
        .ok_or_else(|| MoveParseError::MalformedClick(body.to_owned()))?;
    let coordinate = |s: &str| {
        s.trim()
            .parse::<u16>()
            .map_err(|_| MoveParseError::BadCoordinate(s.trim().to_owned()))
    };
    let (x, y) = (coordinate(x)?, coordinate(y)?);
    Position::from_xy(x, y).ok_or(MoveParseError::OffBoard { x, y })
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Wait => write!(f, "-"),
            Move::Key(direction) => write!(f, "{}", direction.symbol()),
            Move::Click(target) => write!(f, "({},{})", target.x(), target.y()),
        }
    }
}

/// Where a click landed relative to the protagonist when it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClickOffset {
    pub dx: i8,
    pub dy: i8,
}

impl ClickOffset {
    pub fn between(from: Position, to: Position) -> Self {
        Self {
            dx: (i32::from(to.x()) - i32::from(from.x())) as i8,
            dy: (i32::from(to.y()) - i32::from(from.y())) as i8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence() {
        let moves = Move::parse_sequence("ud-(3,4)R").unwrap();
        assert_eq!(
            moves,
            vec![
                Move::Key(Direction::Up),
                Move::Key(Direction::Down),
                Move::Wait,
                Move::Click(Position::from_xy(3, 4).unwrap()),
                Move::Key(Direction::Right),
            ]
        );
        let text: String = moves.iter().map(ToString::to_string).collect();
        assert_eq!(text, "ud-(3,4)r");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            Move::parse_sequence("ux"),
            Err(MoveParseError::UnknownSymbol('x'))
        );
        assert_eq!(
            Move::parse_sequence("(40,1)"),
            Err(MoveParseError::OffBoard { x: 40, y: 1 })
        );
        assert_eq!(
            Move::parse_sequence("(1)"),
            Err(MoveParseError::MalformedClick("1".into()))
        );
        assert_eq!(
            Move::parse_sequence("(a, 2)"),
            Err(MoveParseError::BadCoordinate("a".into()))
        );
        assert_eq!(
            Move::parse_sequence("r(3,4"),
            Err(MoveParseError::UnclosedClick("3,4".into()))
        );
    }

    #[test]
    fn test_click_offset() {
        let from = Position::from_xy(10, 10).unwrap();
        let to = Position::from_xy(7, 14).unwrap();
        assert_eq!(ClickOffset::between(from, to), ClickOffset { dx: -3, dy: 4 });
    }
}
