//! Savestate history
//!
//! Every recorded move adds a node to a branching tree of encoded states.
//! The playback list is the root-to-frontier chain currently being walked
//! and `current` indexes into it; the move log always holds exactly one
//! move per edge of that chain. Rewinding and replaying only move
//! `current`. Recording from the middle of the list cuts the list back to
//! `current` first, while the abandoned nodes stay in the tree for any slot
//! that still points at them.

mod compressor;
mod tree;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::codec::{self, CodecError};
use crate::config::HistoryConfig;
use crate::game::{ClickOffset, Creature, Move, Position};

use compressor::Compressor;
use tree::{NodeId, Tree};

/// A bookmarked node and the moves that reach it.
#[derive(Debug, Clone)]
struct SlotEntry {
    node: NodeId,
    moves: Vec<Move>,
    click_offsets: Vec<ClickOffset>,
}

pub struct History {
    tree: Tree,
    playback: Vec<NodeId>,
    current: usize,
    moves: Vec<Move>,
    /// One entry per click in `moves`, in order.
    click_offsets: Vec<ClickOffset>,
    slots: HashMap<u32, SlotEntry>,
    undesirable: HashSet<u64>,
    compressor: Option<Compressor>,
}

impl History {
    /// Start a history rooted at the level's initial encoded state.
    pub fn new(root: Vec<u8>, config: &HistoryConfig) -> Self {
        let compressor = if config.compress {
            match Compressor::spawn() {
                Ok(compressor) => Some(compressor),
                Err(e) => {
                    warn!("could not start history compression, states stay flat: {e}");
                    None
                }
            }
        } else {
            None
        };

        Self {
            tree: Tree::new(Arc::from(root)),
            playback: vec![Tree::ROOT],
            current: 0,
            moves: Vec::new(),
            click_offsets: Vec::new(),
            slots: HashMap::new(),
            undesirable: HashSet::new(),
            compressor,
        }
    }

    /// Record `input` and the state it produced as a child of the current
    /// node, which then becomes current.
    pub fn record(&mut self, input: Move, state: Vec<u8>) {
        if self.current + 1 < self.playback.len() {
            self.truncate_to_current();
        }

        let parent = self.playback[self.current];
        if let Move::Click(target) = input {
            let from = self.protagonist_at(parent).unwrap_or(target);
            self.click_offsets.push(ClickOffset::between(from, target));
        }

        let node = self.tree.add_child(parent, Arc::from(state));
        self.moves.push(input);
        self.playback.push(node);
        self.current += 1;

        if let Some(compressor) = &self.compressor {
            compressor.submit(Arc::clone(self.tree.payload(node)));
        }
        self.check_invariant();
    }

    fn truncate_to_current(&mut self) {
        let dropped_clicks = self.moves[self.current..]
            .iter()
            .filter(|m| matches!(m, Move::Click(_)))
            .count();
        self.click_offsets
            .truncate(self.click_offsets.len() - dropped_clicks);
        self.moves.truncate(self.current);
        self.playback.truncate(self.current + 1);
    }

    /// Step toward the root. Returns `false` at the root.
    pub fn rewind(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Step back toward the frontier. Returns `false` at the end of the list.
    pub fn replay(&mut self) -> bool {
        if self.current + 1 >= self.playback.len() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Make position `index` of the playback list current.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.playback.len() {
            return false;
        }
        self.current = index;
        true
    }

    pub fn restart(&mut self) {
        self.current = 0;
    }

    /// Bookmark the current node under `key`, replacing any earlier binding.
    pub fn save_slot(&mut self, key: u32) {
        let clicks = count_clicks(&self.moves[..self.current]);
        let entry = SlotEntry {
            node: self.playback[self.current],
            moves: self.moves[..self.current].to_vec(),
            click_offsets: self.click_offsets[..clicks].to_vec(),
        };
        debug!(key, depth = self.current, "saved history slot");
        self.slots.insert(key, entry);
    }

    /// Make the node bound to `key` current. If it is off the playback list
    /// the list becomes that node's ancestry and the move log its own.
    pub fn load_slot(&mut self, key: u32) -> bool {
        let Some(entry) = self.slots.get(&key) else {
            return false;
        };

        if let Some(index) = self.playback.iter().position(|&n| n == entry.node) {
            self.current = index;
        } else {
            self.playback = self.tree.ancestry(entry.node);
            self.moves = entry.moves.clone();
            self.click_offsets = entry.click_offsets.clone();
            self.current = self.playback.len() - 1;
        }
        debug!(key, depth = self.current, "loaded history slot");
        self.check_invariant();
        true
    }

    pub fn has_slot(&self, key: u32) -> bool {
        self.slots.contains_key(&key)
    }

    /// Remember the current state as one to avoid.
    pub fn mark_undesirable(&mut self) -> Result<(), CodecError> {
        let checksum = self.current_checksum()?;
        self.undesirable.insert(checksum);
        Ok(())
    }

    pub fn is_undesirable(&self) -> Result<bool, CodecError> {
        Ok(self.undesirable.contains(&self.current_checksum()?))
    }

    fn current_checksum(&self) -> Result<u64, CodecError> {
        Ok(xxh3_64(&codec::flatten(&self.current_bytes())?))
    }

    /// Protagonist positions from the root to the current node.
    pub fn protagonist_trail(&self) -> Vec<Position> {
        self.playback[..=self.current]
            .iter()
            .filter_map(|&node| self.protagonist_at(node))
            .collect()
    }

    fn protagonist_at(&self, node: NodeId) -> Option<Position> {
        codec::protagonist_word(&self.tree.bytes(node))
            .and_then(Creature::from_bits)
            .map(|chip| chip.position)
    }

    pub fn current_bytes(&self) -> Arc<[u8]> {
        self.tree.bytes(self.playback[self.current])
    }

    pub fn starting_bytes(&self) -> Arc<[u8]> {
        self.tree.bytes(Tree::ROOT)
    }

    /// Moves from the root to the current node.
    pub fn moves(&self) -> &[Move] {
        &self.moves[..self.current]
    }

    /// Moves along the whole playback list, including any ahead of current.
    pub fn full_move_log(&self) -> &[Move] {
        &self.moves
    }

    /// Click offsets for the clicks in [`moves`](Self::moves).
    pub fn click_offsets(&self) -> &[ClickOffset] {
        &self.click_offsets[..count_clicks(self.moves())]
    }

    pub fn playback_len(&self) -> usize {
        self.playback.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of nodes ever recorded, including abandoned branches.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// Block until the compression worker has caught up.
    pub fn wait_for_compression(&self) {
        if let Some(compressor) = &self.compressor {
            compressor.wait_idle();
        }
    }

    fn check_invariant(&self) {
        assert_eq!(
            self.moves.len() + 1,
            self.playback.len(),
            "move log out of step with playback list"
        );
        assert_eq!(
            count_clicks(&self.moves),
            self.click_offsets.len(),
            "click offsets out of step with move log"
        );
    }
}

fn count_clicks(moves: &[Move]) -> usize {
    moves.iter().filter(|m| matches!(m, Move::Click(_))).count()
}
