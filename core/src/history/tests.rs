use super::*;
use crate::codec::{RLE, decode, flatten};
use crate::config::HistoryConfig;
use crate::game::{CELL_COUNT, Direction, Game, LevelDescription, Tile};

// ============================================================================
// Fixtures
// ============================================================================

fn at(x: u16, y: u16) -> Position {
    Position::from_xy(x, y).unwrap()
}

fn level() -> LevelDescription {
    let mut foreground = vec![Tile::Floor; CELL_COUNT];
    foreground[at(5, 5).index()] = Tile::ChipDown;
    LevelDescription::from_layers(foreground, vec![Tile::Floor; CELL_COUNT], &[]).unwrap()
}

fn start(compress: bool) -> (Game, History) {
    let game = Game::new(&level()).unwrap();
    let history = History::new(game.save(), &HistoryConfig { compress });
    (game, history)
}

fn play(game: &mut Game, history: &mut History, input: Move) {
    game.tick(input);
    history.record(input, game.save());
}

fn key(direction: Direction) -> Move {
    Move::Key(direction)
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_rewind_and_replay_stop_at_the_ends() {
    let (mut game, mut history) = start(false);
    assert!(!history.rewind());
    for _ in 0..3 {
        play(&mut game, &mut history, Move::Wait);
    }
    assert_eq!(history.current_index(), 3);
    assert!(!history.replay());

    assert!(history.rewind());
    assert!(history.rewind());
    assert_eq!(history.moves().len(), 1);
    assert_eq!(history.full_move_log().len(), 3);
    assert!(history.replay());
    assert_eq!(history.current_index(), 2);

    history.restart();
    assert_eq!(history.current_index(), 0);
    assert_eq!(history.current_bytes(), history.starting_bytes());
    assert!(!history.rewind());
}

#[test]
fn test_jump_to() {
    let (mut game, mut history) = start(false);
    for _ in 0..4 {
        play(&mut game, &mut history, Move::Wait);
    }
    assert!(history.jump_to(1));
    assert_eq!(history.current_index(), 1);
    assert!(!history.jump_to(5));
    assert_eq!(history.current_index(), 1);
}

#[test]
fn test_recording_mid_list_truncates_to_new_branch() {
    let (mut game, mut history) = start(false);
    for _ in 0..5 {
        play(&mut game, &mut history, key(Direction::Right));
    }
    history.save_slot(1);

    for _ in 0..3 {
        history.rewind();
    }
    game.load(&history.current_bytes()).unwrap();
    play(&mut game, &mut history, key(Direction::Down));

    assert_eq!(history.playback_len(), 4);
    assert_eq!(
        history.moves(),
        &[key(Direction::Right), key(Direction::Right), key(Direction::Down)]
    );
    assert_eq!(history.node_count(), 7);

    assert!(history.load_slot(1));
    assert_eq!(history.playback_len(), 6);
    assert_eq!(history.current_index(), 5);
    assert_eq!(history.moves(), &[key(Direction::Right); 5]);
}

#[test]
fn test_load_slot_on_playback_list_only_moves_current() {
    let (mut game, mut history) = start(false);
    play(&mut game, &mut history, Move::Wait);
    history.save_slot(7);
    play(&mut game, &mut history, Move::Wait);
    play(&mut game, &mut history, Move::Wait);

    assert!(history.load_slot(7));
    assert_eq!(history.current_index(), 1);
    assert_eq!(history.playback_len(), 4);
    assert_eq!(history.full_move_log().len(), 3);
}

#[test]
fn test_unknown_slot_fails() {
    let (_, mut history) = start(false);
    assert!(!history.has_slot(3));
    assert!(!history.load_slot(3));
    assert_eq!(history.current_index(), 0);
}

#[test]
fn test_log_reproduces_transitions() {
    let (mut game, mut history) = start(false);
    let inputs = [
        key(Direction::Right),
        Move::Wait,
        key(Direction::Down),
        Move::Click(at(9, 9)),
        Move::Wait,
    ];
    for input in inputs {
        play(&mut game, &mut history, input);
    }

    let mut replayed = Game::new(&level()).unwrap();
    for (i, &input) in history.moves().to_vec().iter().enumerate() {
        replayed.tick(input);
        assert!(history.jump_to(i + 1));
        assert_eq!(flatten(&history.current_bytes()).unwrap(), replayed.save());
    }
}

// ============================================================================
// Clicks and trail
// ============================================================================

#[test]
fn test_click_offsets_are_relative_and_truncated() {
    let (mut game, mut history) = start(false);
    play(&mut game, &mut history, Move::Click(at(8, 3)));
    play(&mut game, &mut history, Move::Wait);
    play(&mut game, &mut history, Move::Click(at(1, 1)));

    assert_eq!(history.click_offsets().len(), 2);
    assert_eq!(history.click_offsets()[0], ClickOffset { dx: 3, dy: -2 });

    history.rewind();
    assert_eq!(history.click_offsets().len(), 1);

    play(&mut game, &mut history, Move::Wait);
    assert_eq!(history.click_offsets(), &[ClickOffset { dx: 3, dy: -2 }]);
}

#[test]
fn test_protagonist_trail() {
    let (mut game, mut history) = start(true);
    play(&mut game, &mut history, key(Direction::Right));
    play(&mut game, &mut history, key(Direction::Right));
    play(&mut game, &mut history, key(Direction::Down));
    history.wait_for_compression();

    assert_eq!(
        history.protagonist_trail(),
        vec![at(5, 5), at(6, 5), at(7, 5), at(7, 6)]
    );
    history.rewind();
    assert_eq!(history.protagonist_trail().len(), 3);
}

// ============================================================================
// Compression
// ============================================================================

#[test]
fn test_compression_is_transparent() {
    let (mut game, mut history) = start(true);
    let mut expected = Vec::new();
    for input in [key(Direction::Right), Move::Wait, key(Direction::Up)] {
        play(&mut game, &mut history, input);
        expected.push(game.state().clone());
    }
    history.wait_for_compression();

    for (i, state) in expected.iter().enumerate() {
        history.jump_to(i + 1);
        let bytes = history.current_bytes();
        assert_eq!(bytes[0], RLE);
        assert_eq!(&decode(&bytes).unwrap(), state);
    }
    assert_eq!(history.starting_bytes()[0], crate::codec::FLAT);
}

#[test]
fn test_disabled_compression_keeps_flat_states() {
    let (mut game, mut history) = start(false);
    play(&mut game, &mut history, Move::Wait);
    history.wait_for_compression();
    assert_eq!(&*history.current_bytes(), game.save().as_slice());
}

#[test]
fn test_undesirable_survives_compression() {
    let (mut game, mut history) = start(true);
    play(&mut game, &mut history, key(Direction::Left));
    history.mark_undesirable().unwrap();
    history.wait_for_compression();

    assert!(history.is_undesirable().unwrap());
    history.rewind();
    assert!(!history.is_undesirable().unwrap());
}
