//! Ordered accumulator for the preorder ids of one subtree.

use crate::tree::{NodeId, TreeId};

/// Records which tree node currently references a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) tree: TreeId,
    pub(crate) node: NodeId,
}

/// Cache of the depth-first id sequence of a subtree.
///
/// A cache starts dirty. While it is clean, `entries` is exactly the
/// preorder id sequence of the subtree rooted at the node it is attached
/// to, as of the traversal that last rebuilt it.
#[derive(Debug, Clone)]
pub struct SubtreeCache {
    /// Contents are stale and must be rebuilt before use.
    dirty: bool,

    /// Recorded preorder node ids.
    entries: Vec<NodeId>,

    /// Node currently holding a reference to this cache, if any.
    binding: Option<Binding>,
}

impl SubtreeCache {
    /// Creates a new empty cache. New caches are dirty.
    pub fn new() -> Self {
        Self {
            dirty: true,
            entries: Vec::new(),
            binding: None,
        }
    }

    /// Appends a single node id.
    pub fn append(&mut self, id: NodeId) {
        self.entries.push(id);
    }

    /// Appends every entry of `other`, preserving order.
    ///
    /// Used to splice a completed child subtree into the parent's
    /// in-progress sequence. The dirty flag of `other` is not consulted.
    pub fn append_all(&mut self, other: &SubtreeCache) {
        self.entries.extend_from_slice(&other.entries);
    }

    /// Clears the recorded entries without touching the dirty flag.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Marks the contents as stale.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Marks the contents as up to date.
    pub fn finalize(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the recorded preorder ids.
    pub fn entries(&self) -> &[NodeId] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true while some tree node references this cache.
    pub fn is_attached(&self) -> bool {
        self.binding.is_some()
    }

    pub(crate) fn binding(&self) -> Option<Binding> {
        self.binding
    }

    pub(crate) fn bind(&mut self, binding: Binding) {
        self.binding = Some(binding);
    }

    pub(crate) fn release(&mut self) {
        self.binding = None;
    }
}

impl Default for SubtreeCache {
    fn default() -> Self {
        Self::new()
    }
}
