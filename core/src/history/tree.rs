//! Branching tree of recorded states
//!
//! Nodes live in an arena and are addressed by index. A node's bytes are
//! written once at creation and may be swapped once more for their
//! compressed form; nothing else about a node ever changes.

use std::sync::{Arc, RwLock};

pub type NodeId = usize;

/// Encoded state shared between the tree and the compression worker.
#[derive(Debug)]
pub struct Payload {
    bytes: RwLock<Arc<[u8]>>,
}

impl Payload {
    pub fn new(bytes: Arc<[u8]>) -> Self {
        Self {
            bytes: RwLock::new(bytes),
        }
    }

    pub fn bytes(&self) -> Arc<[u8]> {
        match self.bytes.read() {
            Ok(bytes) => Arc::clone(&bytes),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace(&self, bytes: Arc<[u8]>) {
        match self.bytes.write() {
            Ok(mut slot) => *slot = bytes,
            Err(poisoned) => *poisoned.into_inner() = bytes,
        }
    }
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    payload: Arc<Payload>,
}

#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub const ROOT: NodeId = 0;

    pub fn new(root: Arc<[u8]>) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                depth: 0,
                payload: Arc::new(Payload::new(root)),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_child(&mut self, parent: NodeId, bytes: Arc<[u8]>) -> NodeId {
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            depth,
            payload: Arc::new(Payload::new(bytes)),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn payload(&self, id: NodeId) -> &Arc<Payload> {
        &self.nodes[id].payload
    }

    pub fn bytes(&self, id: NodeId) -> Arc<[u8]> {
        self.nodes[id].payload.bytes()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id].depth
    }

    /// The chain from the root down to `id`, inclusive.
    pub fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::with_capacity(self.depth(id) + 1);
        let mut at = Some(id);
        while let Some(node) = at {
            chain.push(node);
            at = self.parent(node);
        }
        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(value: u8) -> Arc<[u8]> {
        Arc::from(vec![value])
    }

    #[test]
    fn test_ancestry_and_depth() {
        let mut tree = Tree::new(bytes(0));
        let a = tree.add_child(Tree::ROOT, bytes(1));
        let b = tree.add_child(a, bytes(2));
        let c = tree.add_child(a, bytes(3));

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.depth(c), 2);
        assert_eq!(tree.ancestry(b), vec![Tree::ROOT, a, b]);
        assert_eq!(tree.ancestry(Tree::ROOT), vec![Tree::ROOT]);
        assert_eq!(tree.children(a), &[b, c]);
        assert_eq!(&*tree.bytes(c), &[3]);
    }

    #[test]
    fn test_payload_swap() {
        let payload = Payload::new(bytes(7));
        let before = payload.bytes();
        payload.replace(bytes(9));
        assert_eq!(&*before, &[7]);
        assert_eq!(&*payload.bytes(), &[9]);
    }
}
