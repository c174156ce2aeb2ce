//! Tick orchestration
//!
//! [`Game`] owns one level in progress. A call to [`Game::tick`] advances
//! it by one half-tick:
//!
//! 1. Sliding flags are re-derived from the slip-roster
//! 2. The tick counter advances and a click target is latched
//! 3. On full ticks after the second, the roster moves
//! 4. A sliding protagonist takes its forced step
//! 5. A pending click walks the protagonist one step (early order)
//! 6. The slip-roster takes its forced steps
//! 7. A key moves the protagonist (or a late-order click walks it)
//! 8. Dead entities are swept, clones appended, traps re-evaluated
//!
//! Any step that kills the protagonist ends the tick immediately.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::board::Board;
use super::creature::{Creature, CreatureKind};
use super::level::{LevelData, LevelDescription, LevelError, Step};
use super::movement::{Slot, TickContext, World};
use super::moves::Move;
use super::position::{CELL_COUNT, Direction};
use super::roster::{Roster, SlipRoster};
use super::rng::Rng;
use super::state::{GameState, Inventory, TrapSet};
use super::tile::Tile;
use crate::codec::{self, CodecError, Form};
use crate::config::EngineConfig;

/// When a pending click moves the protagonist relative to the slip-roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickOrder {
    /// Before sliding entities take their forced steps.
    #[default]
    Early,
    /// Together with key input, after the slip-roster.
    Late,
}

/// How the protagonist acts on this half-tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Key(Direction),
    Click,
    Wait,
}

/// A level in progress.
#[derive(Debug, Clone)]
pub struct Game {
    level: LevelData,
    state: GameState,
    click_order: ClickOrder,
}

impl Game {
    /// Start a level with default engine settings.
    pub fn new(description: &LevelDescription) -> Result<Self, LevelError> {
        Self::with_config(description, &EngineConfig::default())
    }

    pub fn with_config(
        description: &LevelDescription,
        config: &EngineConfig,
    ) -> Result<Self, LevelError> {
        description.validate()?;

        let protagonist = decode_entity("protagonist", description.protagonist)?;
        let roster = description
            .roster
            .iter()
            .map(|&word| decode_entity("roster entry", word))
            .collect::<Result<Vec<_>, _>>()?;

        let foreground: [Tile; CELL_COUNT] = description
            .foreground
            .as_slice()
            .try_into()
            .map_err(|_| LevelError::LayerSize {
                layer: "foreground",
                len: description.foreground.len(),
            })?;
        let background: [Tile; CELL_COUNT] = description
            .background
            .as_slice()
            .try_into()
            .map_err(|_| LevelError::LayerSize {
                layer: "background",
                len: description.background.len(),
            })?;

        let state = GameState {
            board: Board::new(foreground, background),
            protagonist,
            roster: Roster::new(roster),
            slip: SlipRoster::default(),
            inventory: Inventory {
                chips_left: description.chips_required,
                ..Inventory::default()
            },
            rng: Rng::new(description.rng_seed),
            tick: 0,
            click: None,
            traps: TrapSet::default(),
        };

        debug!(
            level = description.number,
            title = %description.title,
            roster = state.roster.len(),
            "level started"
        );

        Ok(Self {
            level: LevelData::from_description(description),
            state,
            click_order: config.click_order,
        })
    }

    /// Advance one half-tick. Returns `true` when the caller must follow up
    /// with a [`Move::Wait`] tick to complete a full-tick key move.
    pub fn tick(&mut self, input: Move) -> bool {
        if self.state.protagonist.is_dead() {
            return false;
        }

        let mut ctx = TickContext::default();
        let mut world = World {
            level: &self.level,
            state: &mut self.state,
            ctx: &mut ctx,
        };
        let again = world.advance(input, self.click_order);
        trace!(tick = self.state.tick, %input, again, "tick");
        again
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn protagonist(&self) -> &Creature {
        &self.state.protagonist
    }

    pub fn inventory(&self) -> &Inventory {
        &self.state.inventory
    }

    pub fn tick_count(&self) -> u16 {
        self.state.tick
    }

    pub fn click_order(&self) -> ClickOrder {
        self.click_order
    }

    /// Timer in tenths of a second. Untimed levels count down from -2 and,
    /// like an expired clock, cycle through -10..=-7 once below -10.
    pub fn time_remaining(&self) -> i32 {
        let elapsed = (i32::from(self.state.tick) - 2).max(0);
        let time = self.level.start_time() - elapsed;
        if time < -10 {
            -10 + (time + 10).rem_euclid(4)
        } else {
            time
        }
    }

    pub fn is_dead(&self) -> bool {
        self.state.protagonist.is_dead()
    }

    /// The protagonist walked into the exit.
    pub fn is_completed(&self) -> bool {
        let chip = &self.state.protagonist;
        chip.is_dead() && self.state.board.fg(chip.position) == Tile::ExitedChip
    }

    /// Serialize the live state in flat form.
    pub fn save(&self) -> Vec<u8> {
        codec::encode(&self.state, Form::Flat)
    }

    /// Replace the live state with a decoded one. On error nothing changes.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.state = codec::decode(bytes)?;
        Ok(())
    }
}

fn decode_entity(what: &'static str, word: u16) -> Result<Creature, LevelError> {
    Creature::from_bits(word).ok_or(LevelError::InvalidEntity { what, word })
}

impl World<'_> {
    fn protagonist_dead(&self) -> bool {
        self.state.protagonist.is_dead()
    }

    fn advance(&mut self, input: Move, order: ClickOrder) -> bool {
        self.state.sync_sliding();
        self.state.tick = self.state.tick.wrapping_add(1);
        let full_tick = self.state.tick % 2 == 1;

        if let Move::Click(target) = input {
            self.state.click = Some(target);
        }
        let intent = match input {
            Move::Key(direction) => Intent::Key(direction),
            _ if self.state.click.is_some()
                && (self.state.protagonist.is_sliding() || !full_tick) =>
            {
                Intent::Click
            }
            _ => Intent::Wait,
        };

        if self.state.tick > 2 && full_tick {
            self.tick_roster();
            if self.protagonist_dead() {
                return false;
            }
        }

        if self.state.protagonist.is_sliding() {
            self.slide_protagonist();
            if self.protagonist_dead() {
                return false;
            }
        }

        if intent == Intent::Click && order == ClickOrder::Early {
            self.walk_toward_click();
            if self.protagonist_dead() {
                return false;
            }
        }

        self.tick_slip_roster();
        if self.protagonist_dead() {
            return false;
        }

        match intent {
            Intent::Key(direction) => self.move_protagonist(&[direction]),
            Intent::Click if order == ClickOrder::Late => self.walk_toward_click(),
            _ => {}
        }
        if self.protagonist_dead() {
            return false;
        }

        self.finish();

        let chip = self.state.protagonist;
        if matches!(intent, Intent::Key(_)) || self.state.click == Some(chip.position) {
            self.state.click = None;
        }
        matches!(intent, Intent::Key(_)) && full_tick && !chip.is_sliding()
    }

    fn tick_roster(&mut self) {
        self.ctx.last_direction = None;
        let blob_step = (self.level.step == Step::Even) != (self.state.tick % 4 == 3);

        for index in 0..self.state.roster.len() {
            let monster = *self.state.roster.get(index);
            if monster.is_block() {
                self.ctx.dead += 1;
                continue;
            }
            if !blob_step && matches!(monster.kind, CreatureKind::Teeth | CreatureKind::Blob) {
                continue;
            }
            if monster.is_dead() || monster.is_sliding() {
                continue;
            }
            if !monster.is_affected_by_clone_bug() {
                self.ctx.last_direction = Some(monster.direction);
            }

            let slot = Slot::Roster(index);
            match self.state.board.bg(monster.position) {
                Tile::CloneMachine => self.tick_cloned(slot),
                Tile::Trap => self.tick_trapped(slot),
                _ => self.tick_free(slot),
            }
            if self.protagonist_dead() {
                return;
            }
        }
    }

    fn slide_protagonist(&mut self) {
        let chip = self.state.protagonist;
        let d = chip.direction;
        if self.state.board.bg(chip.position).is_force_floor() {
            self.tick_creature(Slot::Protagonist, &[d]);
        } else {
            self.tick_creature(Slot::Protagonist, &[d, d.back()]);
        }
    }

    /// Try the candidates in order and stop at the first that moves. While
    /// sliding, only a force floor lets the protagonist steer, and never
    /// along the slide.
    fn move_protagonist(&mut self, directions: &[Direction]) {
        for &direction in directions {
            let chip = self.state.protagonist;
            if chip.is_sliding() {
                let under = self.state.board.bg(chip.position);
                if !under.is_force_floor() || direction == chip.direction {
                    continue;
                }
            }
            if self.tick_creature(Slot::Protagonist, &[direction]) {
                break;
            }
            if self.protagonist_dead() {
                break;
            }
        }
    }

    fn walk_toward_click(&mut self) {
        if let Some(target) = self.state.click {
            let directions = self.state.protagonist.position.seek(target);
            self.move_protagonist(&directions);
        }
    }

    fn tick_slip_roster(&mut self) {
        let sliding = self.state.slip.indices().to_vec();
        for index in sliding {
            if !self.state.slip.contains(index) {
                continue;
            }
            let creature = *self.state.roster.get(index);
            if creature.is_dead() {
                continue;
            }
            let under = self.state.board.bg(creature.position);
            let directions = creature.slide_priority(under, &mut self.state.rng);
            self.tick_creature(Slot::Roster(index), &directions);
            if self.protagonist_dead() {
                return;
            }
        }
    }

    fn finish(&mut self) {
        if self.ctx.dead > 0 || !self.ctx.spawned.is_empty() {
            let spawned = std::mem::take(&mut self.ctx.spawned);
            let GameState { roster, slip, .. } = &mut *self.state;
            roster.compact(spawned, slip);
        }

        for (index, connection) in self.level.trap_connections.iter().enumerate() {
            if self.state.board.bg(connection.button) == Tile::ButtonBrown {
                self.state.traps.set(index, true);
            } else if self.state.board.bg(connection.target) != Tile::Trap {
                self.state.traps.set(index, false);
            }
        }
    }
}
