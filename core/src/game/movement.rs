//! Move resolution
//!
//! A [`World`] borrows the immutable level tables, the live state and the
//! per-tick context for the duration of one tick. Entities are addressed
//! by [`Slot`] and read or written through it at each step, so a move that
//! triggers other moves (block pushes, clones, teleports) always sees
//! current data.

use tracing::warn;

use super::creature::{Creature, CreatureKind, apply_slide};
use super::level::LevelData;
use super::moves::MoveFlags;
use super::position::{Direction, Position};
use super::state::{GameState, Inventory};
use super::tile::Tile;

/// Which entity a move is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Protagonist,
    Roster(usize),
}

/// Signals shared between entities within a single tick.
#[derive(Debug, Default)]
pub(crate) struct TickContext {
    /// Direction inherited by clones and trapped monsters of the kinds
    /// affected by the clone bug.
    pub last_direction: Option<Direction>,
    /// Clones spawned this tick, appended to the roster at compaction.
    pub spawned: Vec<Creature>,
    /// Entities to sweep at compaction; zero with no spawns skips it.
    pub dead: usize,
}

pub(crate) struct World<'a> {
    pub level: &'a LevelData,
    pub state: &'a mut GameState,
    pub ctx: &'a mut TickContext,
}

impl World<'_> {
    pub fn creature(&self, slot: Slot) -> Creature {
        match slot {
            Slot::Protagonist => self.state.protagonist,
            Slot::Roster(index) => *self.state.roster.get(index),
        }
    }

    pub fn creature_mut(&mut self, slot: Slot) -> &mut Creature {
        match slot {
            Slot::Protagonist => &mut self.state.protagonist,
            Slot::Roster(index) => self.state.roster.get_mut(index),
        }
    }

    fn fg(&self, position: Position) -> Tile {
        self.state.board.fg(position)
    }

    fn bg(&self, position: Position) -> Tile {
        self.state.board.bg(position)
    }

    /// Whether some open trap connection targets `position`.
    fn trap_open_at(&self, position: Position) -> bool {
        self.level
            .trap_connections
            .iter()
            .enumerate()
            .any(|(i, c)| c.target == position && self.state.traps.is_open(i))
    }

    /// Put a block that was only a board tile onto the roster so it can
    /// slide. It is counted for the end-of-tick sweep, which drops it again
    /// unless it is still sliding then.
    fn adopt_block(&mut self, block: Creature) -> Slot {
        self.ctx.dead += 1;
        Slot::Roster(self.state.roster.push(block))
    }

    /// Resolve one attempt to move `slot` one cell in `direction`.
    pub fn try_move(&mut self, slot: Slot, direction: Direction) -> MoveFlags {
        self.creature_mut(slot).direction = direction;
        let mover = self.creature(slot);
        let from = mover.position;

        let Some(target) = from.step(direction) else {
            return MoveFlags::FAIL;
        };
        if !mover.can_leave(direction, self.bg(from), self.trap_open_at(from)) {
            return MoveFlags::FAIL;
        }
        let tile = self.fg(target);
        if tile.is_transparent()
            && !mover.can_enter(direction, self.bg(target), &self.state.inventory)
        {
            return MoveFlags::FAIL;
        }

        let flags = self.try_enter(slot, direction, target, tile);

        if flags.moved() {
            self.state.board.pop(from);
            self.creature_mut(slot).position = target;

            if flags.contains(MoveFlags::PORTAL) {
                self.teleport(slot, direction);
            }

            let mover = self.creature(slot);
            if flags.contains(MoveFlags::SLIDING) && !mover.is_monster() {
                let under = self.fg(mover.position);
                let redirected = apply_slide(direction, under, &mut self.state.rng);
                self.creature_mut(slot).direction = redirected;
            }

            if !flags.contains(MoveFlags::DIED) {
                let mover = self.creature(slot);
                self.state.board.insert(mover.position, mover.to_tile());
            }

            if self.bg(target) == Tile::PopUpWall {
                self.state.board.bury(target, Tile::Wall);
            }
        } else {
            let mover = self.creature(slot);
            if mover.sliding && !mover.is_monster() {
                let under = self.bg(mover.position);
                let redirected = apply_slide(direction, under, &mut self.state.rng);
                self.creature_mut(slot).direction = redirected;
            }
        }

        self.set_sliding(slot, flags.contains(MoveFlags::SLIDING));

        if flags.contains(MoveFlags::DIED) {
            if self.creature(slot).is_monster() {
                self.ctx.dead += 1;
            }
            self.creature_mut(slot).kill();
        }

        flags
    }

    /// Apply the entry rules of `tile` at `target` for the entity in `slot`.
    fn try_enter(
        &mut self,
        slot: Slot,
        direction: Direction,
        target: Position,
        tile: Tile,
    ) -> MoveFlags {
        let mover = self.creature(slot);
        let chip = mover.is_chip();
        let monster = mover.is_monster();
        let inventory = self.state.inventory;

        match tile {
            Tile::Floor | Tile::Hint | Tile::Trap | Tile::ToggleOpen => MoveFlags::SUCCESS,
            Tile::Wall
            | Tile::HiddenWallPerm
            | Tile::OverlayBuffer
            | Tile::ToggleClosed
            | Tile::CloneMachine
            | Tile::CloneBlockUp
            | Tile::CloneBlockLeft
            | Tile::CloneBlockDown
            | Tile::CloneBlockRight => MoveFlags::FAIL,

            Tile::Chip => {
                if !chip {
                    return MoveFlags::FAIL;
                }
                self.state.inventory.chips_left = inventory.chips_left.wrapping_sub(1);
                self.clear(target);
                MoveFlags::SUCCESS
            }
            Tile::Water => {
                if chip {
                    if inventory.boots[Inventory::WATER] {
                        return MoveFlags::SUCCESS;
                    }
                    self.replace(target, Tile::DrownedChip);
                    MoveFlags::DEATH
                } else if mover.is_block() {
                    self.replace(target, Tile::Dirt);
                    MoveFlags::DEATH
                } else if mover.kind == CreatureKind::Glider {
                    MoveFlags::SUCCESS
                } else {
                    MoveFlags::DEATH
                }
            }
            Tile::Fire => {
                if chip {
                    if inventory.boots[Inventory::FIRE] {
                        return MoveFlags::SUCCESS;
                    }
                    self.replace(target, Tile::BurnedChip);
                    return MoveFlags::DEATH;
                }
                match mover.kind {
                    CreatureKind::Block | CreatureKind::Fireball => MoveFlags::SUCCESS,
                    CreatureKind::Bug | CreatureKind::Walker => MoveFlags::FAIL,
                    _ => MoveFlags::DEATH,
                }
            }
            Tile::ThinWallUp => MoveFlags::moved_if(direction != Direction::Down),
            Tile::ThinWallRight => MoveFlags::moved_if(direction != Direction::Left),
            Tile::ThinWallDown => MoveFlags::moved_if(direction != Direction::Up),
            Tile::ThinWallLeft => MoveFlags::moved_if(direction != Direction::Right),
            Tile::ThinWallDownRight => {
                MoveFlags::moved_if(matches!(direction, Direction::Down | Direction::Right))
            }
            Tile::Block => {
                if !chip {
                    return MoveFlags::FAIL;
                }
                let block = match self.state.slip.find_at(&self.state.roster, target) {
                    Some(index) => Slot::Roster(index),
                    None => self.adopt_block(Creature::from_tile(target, Tile::Block)),
                };
                self.push_block(slot, block)
            }
            Tile::Dirt | Tile::BlueWallFake => {
                if !chip {
                    return MoveFlags::FAIL;
                }
                self.clear(target);
                MoveFlags::SUCCESS
            }
            Tile::Ice => slide_unless(chip && inventory.boots[Inventory::ICE]),
            Tile::ForceDown | Tile::ForceUp | Tile::ForceLeft | Tile::ForceRight => {
                slide_unless(chip && inventory.boots[Inventory::SUCTION])
            }
            Tile::ForceRandom => {
                if chip && inventory.boots[Inventory::SUCTION] {
                    MoveFlags::SUCCESS
                } else if chip || mover.is_block() {
                    MoveFlags::SLIDE
                } else {
                    MoveFlags::FAIL
                }
            }
            Tile::IceSouthEast | Tile::IceNorthEast | Tile::IceNorthWest | Tile::IceSouthWest => {
                if mover.can_enter(direction, tile, &inventory) {
                    slide_unless(chip && inventory.boots[Inventory::ICE])
                } else {
                    MoveFlags::FAIL
                }
            }
            Tile::Exit => {
                if mover.is_block() {
                    MoveFlags::SUCCESS
                } else if chip {
                    self.replace(target, Tile::ExitedChip);
                    MoveFlags::DEATH
                } else {
                    MoveFlags::FAIL
                }
            }
            Tile::DoorBlue => self.open_door(chip, target, 0, true),
            Tile::DoorRed => self.open_door(chip, target, 1, true),
            Tile::DoorGreen => self.open_door(chip, target, 2, false),
            Tile::DoorYellow => self.open_door(chip, target, 3, true),
            Tile::BlueWallReal | Tile::HiddenWallTemp => {
                if chip {
                    self.replace(target, Tile::Wall);
                }
                MoveFlags::FAIL
            }
            Tile::Thief => {
                if !chip {
                    return MoveFlags::FAIL;
                }
                self.state.inventory.boots = [false; 4];
                MoveFlags::SUCCESS
            }
            Tile::Socket => {
                if !(chip && inventory.chips_left <= 0) {
                    return MoveFlags::FAIL;
                }
                self.clear(target);
                MoveFlags::SUCCESS
            }
            Tile::ButtonGreen => MoveFlags::SUCCESS | MoveFlags::GREEN,
            Tile::ButtonRed => MoveFlags::SUCCESS | MoveFlags::RED,
            Tile::ButtonBrown => MoveFlags::SUCCESS | MoveFlags::BROWN,
            Tile::ButtonBlue => MoveFlags::SUCCESS | MoveFlags::BLUE,
            Tile::Teleport => MoveFlags::SLIDE | MoveFlags::PORTAL,
            Tile::Bomb => {
                if !chip {
                    self.clear(target);
                }
                MoveFlags::DEATH
            }
            Tile::Gravel => MoveFlags::moved_if(!monster),
            Tile::PopUpWall => MoveFlags::moved_if(chip),
            Tile::DrownedChip
            | Tile::BurnedChip
            | Tile::BombedChip
            | Tile::Unused36
            | Tile::Unused37
            | Tile::IceBlockStatic
            | Tile::ExitedChip
            | Tile::ExitExtra1
            | Tile::ExitExtra2 => MoveFlags::FAIL,
            Tile::SwimmingUp
            | Tile::SwimmingLeft
            | Tile::SwimmingDown
            | Tile::SwimmingRight
            | Tile::ChipUp
            | Tile::ChipLeft
            | Tile::ChipDown
            | Tile::ChipRight => {
                if chip {
                    return MoveFlags::FAIL;
                }
                self.state.protagonist.kill();
                MoveFlags::SUCCESS
            }
            Tile::KeyBlue | Tile::KeyRed | Tile::KeyGreen | Tile::KeyYellow => {
                if chip {
                    let key = usize::from(tile.byte() - Tile::KeyBlue.byte());
                    self.clear(target);
                    let count = &mut self.state.inventory.keys[key];
                    *count = count.wrapping_add(1);
                }
                MoveFlags::SUCCESS
            }
            Tile::BootsWater | Tile::BootsFire | Tile::BootsIce | Tile::BootsSlide => {
                if chip {
                    let boot = usize::from(tile.byte() - Tile::BootsWater.byte());
                    self.clear(target);
                    self.state.inventory.boots[boot] = true;
                }
                MoveFlags::moved_if(!monster)
            }
            // monsters
            _ => {
                if chip {
                    MoveFlags::DEATH
                } else {
                    MoveFlags::FAIL
                }
            }
        }
    }

    fn open_door(&mut self, chip: bool, target: Position, key: usize, consume: bool) -> MoveFlags {
        if !chip || self.state.inventory.keys[key] == 0 {
            return MoveFlags::FAIL;
        }
        if consume {
            self.state.inventory.keys[key] -= 1;
        }
        self.clear(target);
        MoveFlags::SUCCESS
    }

    fn clear(&mut self, position: Position) {
        self.replace(position, Tile::Floor);
    }

    fn replace(&mut self, position: Position, tile: Tile) {
        self.state.board.replace(position, tile);
    }

    /// Push `block` in the pusher's facing, then let the pusher step into
    /// the vacated cell.
    fn push_block(&mut self, pusher: Slot, block: Slot) -> MoveFlags {
        let direction = self.creature(pusher).direction;
        let resting = self.creature(block);
        if resting.sliding
            && (resting.direction == direction || resting.direction == direction.back())
        {
            return MoveFlags::FAIL;
        }

        let vacated = resting.position;
        let block_flags = self.try_move(block, direction);
        if !block_flags.moved() {
            return MoveFlags::FAIL;
        }

        let pusher_flags = self.try_enter(pusher, direction, vacated, self.fg(vacated));
        if pusher_flags.moved() {
            let landed = self.creature(block).position;
            if block_flags.contains(MoveFlags::RED) {
                self.trigger_clones(landed);
            }
            if block_flags.contains(MoveFlags::BROWN) {
                self.open_trap(landed);
            }
        }
        pusher_flags | (block_flags & (MoveFlags::GREEN | MoveFlags::BLUE))
    }

    /// Carry an entity that just stepped onto a teleport to the exit.
    ///
    /// Teleports are scanned backward from the entered one, wrapping. If
    /// none admits the entity it stays on the teleport it entered.
    fn teleport(&mut self, slot: Slot, direction: Direction) {
        let level = self.level;
        let teleports = &level.teleports;
        let entered = self.creature(slot).position;
        let Some(start) = teleports.iter().position(|&p| p == entered) else {
            warn!(cell = %entered, "entered a teleport missing from the teleport list");
            return;
        };

        let count = teleports.len();
        let mut i = start;
        loop {
            i = (i + count - 1) % count;
            let cell = teleports[i];
            self.creature_mut(slot).position = cell;
            if self.exit_admits(slot, cell, direction) || i == start {
                break;
            }
        }
    }

    fn exit_admits(&mut self, slot: Slot, cell: Position, direction: Direction) -> bool {
        if self.fg(cell) != Tile::Teleport {
            return false;
        }
        let Some(exit) = cell.step(direction) else {
            return false;
        };
        let mut exit_tile = self.fg(exit);
        if exit_tile.is_transparent() {
            exit_tile = self.bg(exit);
        }

        let mover = self.creature(slot);
        if mover.is_chip() && exit_tile == Tile::Block {
            let block = Creature::new(direction, CreatureKind::Block, exit);
            let under = self.bg(exit);
            if mover.can_enter(direction, under, &self.state.inventory)
                && block.can_leave(direction, under, self.trap_open_at(exit))
            {
                let Some(beyond) = exit.step(direction) else {
                    return false;
                };
                if block.can_enter(direction, self.fg(beyond), &self.state.inventory) {
                    return true;
                }
            }
            let block = self.adopt_block(block);
            self.push_block(slot, block);
        }

        self.creature(slot)
            .can_enter(direction, exit_tile, &self.state.inventory)
    }

    /// Sliding transitions keep the slip-roster (or, for the protagonist,
    /// its kind) in step with the flag. A block resting on a trap keeps
    /// sliding.
    fn set_sliding(&mut self, slot: Slot, sliding: bool) {
        let creature = self.creature(slot);
        if creature.sliding && !sliding {
            if creature.is_block() && self.bg(creature.position) == Tile::Trap {
                return;
            }
            match slot {
                Slot::Protagonist => {
                    if !creature.is_dead() {
                        self.state.protagonist.kind = CreatureKind::Chip;
                    }
                }
                Slot::Roster(index) => self.state.slip.remove(index),
            }
        } else if !creature.sliding && sliding {
            match slot {
                Slot::Protagonist => {
                    if !creature.is_dead() {
                        self.state.protagonist.kind = CreatureKind::ChipSliding;
                    }
                }
                Slot::Roster(index) => self.state.slip.push(index),
            }
        }
        self.creature_mut(slot).sliding = sliding;
    }

    /// Try each candidate until one moves. Button presses take effect after
    /// every attempt, successful or not.
    pub fn tick_creature(&mut self, slot: Slot, directions: &[Direction]) -> bool {
        let before = self.creature(slot);
        for &direction in directions {
            let flags = self.try_move(slot, direction);
            self.press_buttons(slot, flags);
            if flags.moved() {
                return true;
            }
        }

        self.set_sliding(slot, before.sliding);
        let creature = self.creature_mut(slot);
        if creature.is_tank() {
            creature.kind = CreatureKind::TankStationary;
        } else {
            creature.direction = before.direction;
        }
        false
    }

    fn press_buttons(&mut self, slot: Slot, flags: MoveFlags) {
        if !flags.intersects(MoveFlags::BUTTONS) {
            return;
        }
        if flags.contains(MoveFlags::GREEN) {
            let level = self.level;
            for &cell in &level.toggle_doors {
                self.state.board.toggle(cell);
            }
        }

        let at = self.creature(slot).position;
        if flags.contains(MoveFlags::RED) {
            self.trigger_clones(at);
        }
        if flags.contains(MoveFlags::BROWN) {
            self.open_trap(at);
        }

        if flags.contains(MoveFlags::BLUE) {
            let GameState { roster, board, .. } = &mut *self.state;
            for tank in roster.iter_mut() {
                if tank.is_tank() && !tank.is_sliding() {
                    tank.kind = CreatureKind::TankMoving;
                    tank.direction = tank.direction.right();
                    board.replace(tank.position, tank.to_tile());
                    tank.direction = tank.direction.right();
                }
            }
        }
    }

    fn trigger_clones(&mut self, button: Position) {
        let level = self.level;
        for connection in &level.clone_connections {
            if connection.button == button {
                self.add_clone(connection.target);
            }
        }
    }

    fn open_trap(&mut self, button: Position) {
        if let Some(index) = self
            .level
            .trap_connections
            .iter()
            .position(|c| c.button == button)
        {
            self.state.traps.set(index, true);
        }
    }

    /// Spawn a copy of the template standing on a clone machine.
    fn add_clone(&mut self, cloner: Position) {
        let occupied = self
            .state
            .roster
            .iter()
            .any(|c| !c.is_block() && c.position == cloner)
            || self.ctx.spawned.iter().any(|c| c.position == cloner);
        if occupied {
            return;
        }

        let template = self.fg(cloner);
        if !template.is_creature() {
            return;
        }

        let clone = Creature::from_tile(cloner, template);
        self.ctx.last_direction = Some(clone.direction);
        let Some(ahead) = cloner.step(clone.direction) else {
            return;
        };
        let ahead_tile = self.fg(ahead);
        if clone.can_enter(clone.direction, ahead_tile, &self.state.inventory)
            || ahead_tile == clone.to_tile()
        {
            if clone.is_block() {
                let slot = self.adopt_block(clone);
                self.tick_cloned(slot);
            } else {
                self.ctx.spawned.push(clone);
            }
        }
    }

    /// Move an entity off a clone machine, refilling the machine behind it.
    pub fn tick_cloned(&mut self, slot: Slot) {
        let monster = self.creature(slot);
        let cloner = monster.position;
        let template = if monster.is_block() {
            Tile::clone_block(monster.direction)
        } else {
            monster.to_tile()
        };
        if !monster.is_affected_by_clone_bug() {
            self.ctx.last_direction = Some(monster.direction);
        }
        let Some(direction) = self.ctx.last_direction else {
            return;
        };

        let moved = if monster.kind == CreatureKind::Blob {
            let chip = self.state.protagonist.position;
            let directions = monster.direction_priority(chip, &mut self.state.rng);
            self.tick_creature(slot, &directions)
        } else {
            match cloner.step(direction) {
                Some(ahead)
                    if monster.can_enter(direction, self.fg(ahead), &self.state.inventory) =>
                {
                    self.tick_creature(slot, &[direction])
                }
                _ => false,
            }
        };

        if moved {
            self.state.board.insert(cloner, template);
        }
    }

    pub fn tick_trapped(&mut self, slot: Slot) {
        let monster = self.creature(slot);
        if !monster.is_affected_by_clone_bug() {
            self.ctx.last_direction = Some(monster.direction);
        }
        let Some(direction) = self.ctx.last_direction else {
            return;
        };
        if monster.kind == CreatureKind::TankStationary {
            self.creature_mut(slot).kind = CreatureKind::TankMoving;
        }
        if monster.kind == CreatureKind::Blob {
            let chip = self.state.protagonist.position;
            let directions = monster.direction_priority(chip, &mut self.state.rng);
            self.tick_creature(slot, &directions);
        } else {
            self.tick_creature(slot, &[direction]);
        }
    }

    pub fn tick_free(&mut self, slot: Slot) {
        let chip = self.state.protagonist.position;
        let directions = self
            .creature(slot)
            .direction_priority(chip, &mut self.state.rng);
        let moved = self.tick_creature(slot, &directions);

        let monster = self.creature(slot);
        if !moved && monster.kind == CreatureKind::Teeth && !monster.is_sliding() {
            if let Some(&facing) = directions.first() {
                self.ctx.last_direction = Some(facing);
                let teeth = self.creature_mut(slot);
                teeth.direction = facing;
                let (position, tile) = (teeth.position, teeth.to_tile());
                self.replace(position, tile);
            }
        }
    }
}

fn slide_unless(immune: bool) -> MoveFlags {
    if immune {
        MoveFlags::SUCCESS
    } else {
        MoveFlags::SLIDE
    }
}
