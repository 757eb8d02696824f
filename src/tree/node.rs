//! Tree node representation and ancestor invalidation.

use crate::cache::{CacheHandle, WeakCache};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a node within a tree generation.
///
/// Ids are dense and sequential: the root is 0 and every insertion takes
/// the next id.
pub type NodeId = u64;

/// Id of the root node.
pub const ROOT: NodeId = 0;

/// Process-unique identity of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

impl TreeId {
    /// Generate a new unique tree id.
    pub(crate) fn next() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A vertex of the tree, owned by the tree's arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Unique node identifier.
    id: NodeId,
    /// Parent node (None for root).
    parent: Option<NodeId>,
    /// Children in traversal order.
    children: Vec<NodeId>,
    /// Attached cache, not owned.
    cache: Option<WeakCache>,
}

impl TreeNode {
    /// Create the root node.
    pub(crate) fn root() -> Self {
        Self::new(ROOT)
    }

    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            cache: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get parent node id.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in the order they are traversed.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the attached cache if one is attached and still owned by
    /// a caller.
    pub fn cache(&self) -> Option<CacheHandle> {
        self.cache.as_ref().and_then(WeakCache::upgrade)
    }

    /// Returns true if a cache reference is attached, live or dangling.
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) fn cache_ref(&self) -> Option<&WeakCache> {
        self.cache.as_ref()
    }

    /// Appends a child. Dirtiness is left alone.
    pub(crate) fn add_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    /// Records the parent. The caller runs [`invalidate_ancestors`] from
    /// the new parent afterwards.
    pub(crate) fn set_parent(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }

    /// Stores a cache reference, returning the one it replaces.
    pub(crate) fn attach_cache(&mut self, cache: WeakCache) -> Option<WeakCache> {
        self.cache.replace(cache)
    }

    pub(crate) fn detach_cache(&mut self) -> Option<WeakCache> {
        self.cache.take()
    }
}

/// Marks every cache on the path from `start` up to the root dirty.
///
/// `start` itself is included. The walk does not stop at the first cached
/// ancestor: each cache on the path covers a subtree that contains the
/// change. Dropped caches are skipped. Returns the number of caches marked.
pub(crate) fn invalidate_ancestors(nodes: &[TreeNode], start: Option<NodeId>) -> usize {
    let mut marked = 0;
    let mut current = start;

    while let Some(id) = current {
        let Some(node) = nodes.get(id as usize) else {
            break;
        };
        if let Some(cache) = node.cache() {
            cache.lock().mark_dirty();
            marked += 1;
        }
        current = node.parent();
    }

    marked
}
