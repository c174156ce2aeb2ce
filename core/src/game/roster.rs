//! Roster and slip-roster
//!
//! The roster holds every non-protagonist entity in tie-break order. The
//! slip-roster is an ordered list of roster indices for the entities that
//! terrain is currently pushing along.

use super::creature::Creature;
use super::position::Position;

/// Ordered live entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    creatures: Vec<Creature>,
}

impl Roster {
    pub fn new(creatures: Vec<Creature>) -> Self {
        Self { creatures }
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn get(&self, index: usize) -> &Creature {
        &self.creatures[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Creature {
        &mut self.creatures[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Creature> {
        self.creatures.iter_mut()
    }

    pub fn as_slice(&self) -> &[Creature] {
        &self.creatures
    }

    /// Append an entity and return its index.
    pub fn push(&mut self, creature: Creature) -> usize {
        self.creatures.push(creature);
        self.creatures.len() - 1
    }

    /// Drop dead entities and blocks that stopped sliding, then append the
    /// tick's spawned clones. Survivors keep their relative order and slip
    /// indices are rewritten to follow them.
    pub fn compact(&mut self, spawned: Vec<Creature>, slip: &mut SlipRoster) {
        let mut remap = vec![None; self.creatures.len()];
        let mut kept = Vec::with_capacity(self.creatures.len() + spawned.len());
        for (old, creature) in self.creatures.drain(..).enumerate() {
            let absorbed = creature.is_block() && !creature.sliding;
            if creature.is_dead() || absorbed {
                continue;
            }
            remap[old] = Some(kept.len());
            kept.push(creature);
        }
        kept.extend(spawned);
        self.creatures = kept;
        slip.remap(&remap);
    }
}

/// Indices of the currently sliding roster entities, in slide order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlipRoster {
    indices: Vec<usize>,
}

impl SlipRoster {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    pub fn remove(&mut self, index: usize) {
        if let Some(at) = self.indices.iter().position(|&i| i == index) {
            self.indices.remove(at);
        }
    }

    /// The roster index of a sliding entity standing on `position`.
    pub fn find_at(&self, roster: &Roster, position: Position) -> Option<usize> {
        self.indices
            .iter()
            .copied()
            .find(|&i| roster.get(i).position == position)
    }

    fn remap(&mut self, remap: &[Option<usize>]) {
        self.indices = self
            .indices
            .iter()
            .filter_map(|&i| remap.get(i).copied().flatten())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::creature::CreatureKind;
    use crate::game::position::Direction;

    fn creature(kind: CreatureKind, index: u16) -> Creature {
        Creature::new(Direction::Up, kind, Position::new(index).unwrap())
    }

    #[test]
    fn test_compact_preserves_order_and_remaps_slip() {
        let mut dead = creature(CreatureKind::Bug, 1);
        dead.kill();
        let resting_block = creature(CreatureKind::Block, 2);
        let mut sliding_block = creature(CreatureKind::Block, 3);
        sliding_block.sliding = true;
        let mut glider = creature(CreatureKind::Glider, 4);
        glider.sliding = true;
        let walker = creature(CreatureKind::Walker, 5);

        let mut roster = Roster::new(vec![dead, resting_block, sliding_block, glider, walker]);
        let mut slip = SlipRoster::new(vec![3, 2]);
        let clone = creature(CreatureKind::Fireball, 6);
        roster.compact(vec![clone], &mut slip);

        let cells: Vec<u16> = roster.iter().map(|c| c.position.raw()).collect();
        assert_eq!(cells, vec![3, 4, 5, 6]);
        assert_eq!(slip.indices(), &[1, 0]);
    }

    #[test]
    fn test_find_at() {
        let roster = Roster::new(vec![
            creature(CreatureKind::Block, 9),
            creature(CreatureKind::Block, 12),
        ]);
        let slip = SlipRoster::new(vec![1]);
        assert_eq!(slip.find_at(&roster, Position::new(12).unwrap()), Some(1));
        assert_eq!(slip.find_at(&roster, Position::new(9).unwrap()), None);
    }
}
