//! Read-only view of a tree for printers and dumps.
//!
//! A snapshot copies out everything an external renderer needs (ids,
//! links and cache state) so the tree itself never performs I/O.

use crate::tree::{NodeId, Tree, TreeNode, ROOT};
use serde::Serialize;

/// State of the cache attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CacheState {
    /// No cache attached.
    None,
    /// A live cache is attached.
    Attached { dirty: bool, entries: Vec<NodeId> },
    /// A cache was attached but its owner dropped it.
    Dangling,
}

/// One node of a [`TreeSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub cache: CacheState,
}

/// Copy of a tree's structure and cache state, nodes in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeSnapshot {
    pub nodes: Vec<NodeSnapshot>,
}

impl TreeSnapshot {
    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.get(id as usize)
    }

    /// Returns `(depth, node)` pairs in depth-first preorder, root at
    /// depth 0.
    pub fn preorder(&self) -> Vec<(usize, &NodeSnapshot)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = match self.node(ROOT) {
            Some(root) => vec![(0, root)],
            None => return out,
        };

        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for &child in node.children.iter().rev() {
                if let Some(child) = self.node(child) {
                    stack.push((depth + 1, child));
                }
            }
        }

        out
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&TreeNode> for NodeSnapshot {
    fn from(node: &TreeNode) -> Self {
        let cache = match (node.has_cache(), node.cache()) {
            (_, Some(cache)) => {
                let cache = cache.lock();
                CacheState::Attached {
                    dirty: cache.is_dirty(),
                    entries: cache.entries().to_vec(),
                }
            }
            (true, None) => CacheState::Dangling,
            (false, None) => CacheState::None,
        };

        Self {
            id: node.id(),
            parent: node.parent(),
            children: node.children().to_vec(),
            cache,
        }
    }
}

impl Tree {
    /// Captures the current structure and cache state.
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            nodes: self.nodes().map(NodeSnapshot::from).collect(),
        }
    }
}
