//! A level being played with full history
//!
//! [`Session`] keeps the live [`Game`] and its [`History`] in step: every
//! tick is recorded, and every history navigation loads the selected state
//! back into the game.

use crate::codec::CodecError;
use crate::config::Config;
use crate::game::{Game, LevelDescription, LevelError, Move};
use crate::history::History;

pub struct Session {
    game: Game,
    history: History,
}

impl Session {
    pub fn new(level: &LevelDescription, config: &Config) -> Result<Self, LevelError> {
        let game = Game::with_config(level, &config.engine)?;
        let history = History::new(game.save(), &config.history);
        Ok(Self { game, history })
    }

    /// Tick once with `input` and record it. When the engine asks for the
    /// settling half-tick, a wait is ticked and recorded as well. Returns
    /// whether that extra tick happened.
    pub fn play(&mut self, input: Move) -> bool {
        let again = self.game.tick(input);
        self.history.record(input, self.game.save());
        if again {
            self.game.tick(Move::Wait);
            self.history.record(Move::Wait, self.game.save());
        }
        again
    }

    /// Play a move sequence until it runs out or the protagonist is gone.
    /// Returns how many inputs were played.
    pub fn play_all(&mut self, inputs: &[Move]) -> usize {
        for (played, &input) in inputs.iter().enumerate() {
            if self.game.is_dead() {
                return played;
            }
            self.play(input);
        }
        inputs.len()
    }

    pub fn rewind(&mut self) -> Result<bool, CodecError> {
        let moved = self.history.rewind();
        self.sync_if(moved)
    }

    pub fn replay(&mut self) -> Result<bool, CodecError> {
        let moved = self.history.replay();
        self.sync_if(moved)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<bool, CodecError> {
        let moved = self.history.jump_to(index);
        self.sync_if(moved)
    }

    pub fn restart(&mut self) -> Result<(), CodecError> {
        self.history.restart();
        self.sync()
    }

    pub fn save_slot(&mut self, key: u32) {
        self.history.save_slot(key);
    }

    pub fn load_slot(&mut self, key: u32) -> Result<bool, CodecError> {
        let found = self.history.load_slot(key);
        self.sync_if(found)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn sync_if(&mut self, moved: bool) -> Result<bool, CodecError> {
        if moved {
            self.sync()?;
        }
        Ok(moved)
    }

    fn sync(&mut self) -> Result<(), CodecError> {
        self.game.load(&self.history.current_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CELL_COUNT, Direction, Position, Tile};

    fn session() -> Session {
        let mut foreground = vec![Tile::Floor; CELL_COUNT];
        foreground[5 * 32 + 5] = Tile::ChipDown;
        let level =
            LevelDescription::from_layers(foreground, vec![Tile::Floor; CELL_COUNT], &[]).unwrap();
        Session::new(&level, &Config::default()).unwrap()
    }

    #[test]
    fn test_full_tick_key_records_settle_wait() {
        let mut session = session();
        assert!(session.play(Move::Key(Direction::Right)));
        assert_eq!(
            session.history().moves(),
            &[Move::Key(Direction::Right), Move::Wait]
        );
        assert_eq!(session.game().tick_count(), 2);
    }

    #[test]
    fn test_navigation_restores_game() {
        let mut session = session();
        session.play(Move::Key(Direction::Right));
        session.play(Move::Key(Direction::Right));
        assert_eq!(
            session.game().protagonist().position,
            Position::from_xy(7, 5).unwrap()
        );

        session.save_slot(0);
        assert!(session.rewind().unwrap());
        assert!(session.rewind().unwrap());
        assert_eq!(
            session.game().protagonist().position,
            Position::from_xy(6, 5).unwrap()
        );

        session.restart().unwrap();
        assert_eq!(session.game().tick_count(), 0);
        assert!(!session.rewind().unwrap());

        assert!(session.load_slot(0).unwrap());
        assert_eq!(session.game().tick_count(), 4);
        assert!(!session.load_slot(9).unwrap());
    }

    #[test]
    fn test_play_all_stops_once_protagonist_is_gone() {
        let mut foreground = vec![Tile::Floor; CELL_COUNT];
        foreground[5 * 32 + 5] = Tile::ChipDown;
        foreground[5 * 32 + 6] = Tile::Water;
        let level =
            LevelDescription::from_layers(foreground, vec![Tile::Floor; CELL_COUNT], &[]).unwrap();
        let mut drowned = Session::new(&level, &Config::default()).unwrap();

        let right = Move::Key(Direction::Right);
        assert_eq!(drowned.play_all(&[right, right, right]), 1);
        assert!(drowned.game().is_dead());
        assert_eq!(drowned.history().moves(), &[right]);

        let mut alive = session();
        assert_eq!(alive.play_all(&[right, Move::Wait]), 2);
        assert_eq!(alive.history().moves().len(), 3);
    }
}
