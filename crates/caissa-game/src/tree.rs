//! Arena-backed move tree.
//!
//! Nodes own their children through an index arena held by the tree; parent
//! links are plain indices, so cloning the tree is a deep copy with no
//! reference fixups. Child order is significant: index 0 is the main line,
//! later children are variations.

use caissa_core::Move;
use caissa_engine::Position;
use std::collections::BTreeMap;

/// Handle to a node in a game's move tree.
///
/// Ids are only meaningful for the tree that issued them (or its clones).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// One node of the move tree: a played move plus everything PGN attaches
/// to it.
///
/// The synthetic root node carries the starting position and no move.
#[derive(Debug, Clone)]
pub struct MoveNode {
    pub(crate) mov: Option<Move>,
    pub(crate) position: Position,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) comment: String,
    pub(crate) commands: BTreeMap<String, String>,
    pub(crate) nag: String,
    pub(crate) number: u32,
}

impl MoveNode {
    /// The move that produced this node, or `None` on the root.
    pub fn mov(&self) -> Option<Move> {
        self.mov
    }

    /// The position after this node's move (the starting position on the
    /// root).
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Commentary attached to the move.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// `[%name value]` command annotations attached to the move.
    pub fn commands(&self) -> &BTreeMap<String, String> {
        &self.commands
    }

    /// The numeric annotation glyph, such as `"$2"`, or empty.
    pub fn nag(&self) -> &str {
        &self.nag
    }

    /// The full move number this node was recorded under.
    pub fn number(&self) -> u32 {
        self.number
    }

    fn new(mov: Option<Move>, position: Position, parent: Option<NodeId>, number: u32) -> Self {
        MoveNode {
            mov,
            position,
            parent,
            children: Vec::new(),
            comment: String::new(),
            commands: BTreeMap::new(),
            nag: String::new(),
            number,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MoveTree {
    nodes: Vec<MoveNode>,
}

impl MoveTree {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(start: Position) -> Self {
        MoveTree {
            nodes: vec![MoveNode::new(None, start, None, 0)],
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0]
    }

    /// Attaches a new child under `parent`; prepended when `front` is set,
    /// appended otherwise.
    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        mov: Move,
        position: Position,
        number: u32,
        front: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(MoveNode::new(Some(mov), position, Some(parent), number));
        let children = &mut self.nodes[parent.0].children;
        if front {
            children.insert(0, id);
        } else {
            children.push(id);
        }
        id
    }

    /// Finds a child of `parent` playing the same origin, destination, and
    /// promotion as `m`.
    pub(crate) fn find_child(&self, parent: NodeId, m: Move) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&child| match self.node(child).mov {
                Some(existing) => {
                    existing.from() == m.from()
                        && existing.to() == m.to()
                        && existing.promotion() == m.promotion()
                }
                None => false,
            })
    }

    /// Rotates `child` to the front of `parent`'s children, preserving the
    /// relative order of its siblings.
    pub(crate) fn promote_child(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        if let Some(idx) = children.iter().position(|&c| c == child) {
            children[..=idx].rotate_right(1);
        }
    }

    /// True when every step from the root to `id` follows a first child.
    pub(crate) fn is_main_line(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            if self.node(parent).children.first() != Some(&current) {
                return false;
            }
            current = parent;
        }
        true
    }

    /// The main line from the root's first child to its leaf; empty when no
    /// moves have been played.
    pub(crate) fn main_line(&self) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut current = Self::ROOT;
        while let Some(&next) = self.node(current).children.first() {
            line.push(next);
            current = next;
        }
        line
    }

    /// Every root-to-leaf path, visiting children left to right.
    pub(crate) fn leaf_paths(&self) -> Vec<Vec<NodeId>> {
        let mut paths = Vec::new();
        let mut prefix = Vec::new();
        for &child in &self.node(Self::ROOT).children {
            self.collect_paths(child, &mut prefix, &mut paths);
        }
        paths
    }

    fn collect_paths(&self, id: NodeId, prefix: &mut Vec<NodeId>, out: &mut Vec<Vec<NodeId>>) {
        prefix.push(id);
        let children = &self.node(id).children;
        if children.is_empty() {
            out.push(prefix.clone());
        } else {
            for &child in children {
                self.collect_paths(child, prefix, out);
            }
        }
        prefix.pop();
    }
}
