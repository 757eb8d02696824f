//! Tree arena and structural mutations.

use super::node::{invalidate_ancestors, NodeId, TreeId, TreeNode, ROOT};
use super::traversal::TraversalStats;
use crate::cache::subtree_cache::Binding;
use crate::cache::CacheHandle;
use crate::error::{Result, TreeError};
use tracing::debug;

/// A mutable tree whose nodes may carry subtree caches.
///
/// Nodes live in an arena indexed by [`NodeId`]. Every node id passed in
/// by a caller is clamped into `[0, max_id]` instead of being rejected.
#[derive(Debug)]
pub struct Tree {
    /// Identity used to bind caches to this tree.
    id: TreeId,
    /// All nodes, indexed by id. Never empty.
    pub(super) nodes: Vec<TreeNode>,
    /// Bootstrap destination of every traversal.
    pub(super) result: CacheHandle,
    /// Counters from the most recent successful traversal.
    pub(super) last_stats: TraversalStats,
}

impl Tree {
    /// Creates a tree holding only the root node.
    pub fn new() -> Self {
        Self {
            id: TreeId::next(),
            nodes: vec![TreeNode::root()],
            result: CacheHandle::new(),
            last_stats: TraversalStats::default(),
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[ROOT as usize]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Largest node id currently allocated.
    pub fn max_id(&self) -> NodeId {
        (self.nodes.len() - 1) as NodeId
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id as usize)
    }

    /// Iterates over the nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Counters recorded by the last successful [`Tree::collect_ordered`].
    pub fn last_stats(&self) -> TraversalStats {
        self.last_stats
    }

    /// Saturates a caller-supplied id into the valid range.
    pub fn clamp_id(&self, requested: i64) -> NodeId {
        if requested <= 0 {
            ROOT
        } else {
            (requested as u64).min(self.max_id())
        }
    }

    /// Inserts a new node as the last child of `parent` and returns its id.
    ///
    /// Every cache on the path from `parent` to the root becomes dirty.
    pub fn insert_node(&mut self, parent: i64) -> NodeId {
        let parent = self.clamp_id(parent);
        let id = self.nodes.len() as NodeId;

        let mut node = TreeNode::new(id);
        node.set_parent(parent);
        self.nodes.push(node);
        self.nodes[parent as usize].add_child(id);

        let invalidated = invalidate_ancestors(&self.nodes, Some(parent));
        debug!(node = id, parent, invalidated, "inserted node");
        id
    }

    /// Attaches a caller-owned cache to a node.
    ///
    /// The tree keeps only a weak reference. A cache can be attached to
    /// one node at a time; re-attaching it to the node it already sits on
    /// just invalidates the ancestors again. A cache newly bound here is
    /// marked dirty, and a cache it replaces is released.
    pub fn attach_cache(&mut self, node: i64, cache: &CacheHandle) -> Result<()> {
        let node_id = self.clamp_id(node);
        let binding = Binding {
            tree: self.id,
            node: node_id,
        };

        {
            let mut guard = cache.lock();
            match guard.binding() {
                Some(existing) if existing == binding => {}
                Some(_) => return Err(TreeError::CacheAlreadyAttached { node: node_id }),
                None => {
                    guard.bind(binding);
                    guard.mark_dirty();
                }
            }
        }

        let replaced = self.nodes[node_id as usize].attach_cache(cache.downgrade());
        if let Some(previous) = replaced.filter(|previous| !previous.refers_to(cache)) {
            if let Some(previous) = previous.upgrade() {
                previous.lock().release();
            }
        }

        let parent = self.nodes[node_id as usize].parent();
        let invalidated = invalidate_ancestors(&self.nodes, parent);
        debug!(node = node_id, invalidated, "attached cache");
        Ok(())
    }

    /// Removes the cache attached to a node, if any, and returns it when a
    /// caller still owns it. Ancestor caches become dirty.
    pub fn detach_cache(&mut self, node: i64) -> Option<CacheHandle> {
        let node_id = self.clamp_id(node);
        let detached = self.nodes[node_id as usize].detach_cache()?;

        let handle = detached.upgrade();
        if let Some(handle) = &handle {
            handle.lock().release();
        }

        let parent = self.nodes[node_id as usize].parent();
        let invalidated = invalidate_ancestors(&self.nodes, parent);
        debug!(node = node_id, invalidated, "detached cache");
        handle
    }

    /// Discards every node and recreates the root with id 0.
    ///
    /// Attached caches are released; the tree keeps no reference to them
    /// and they may be attached again later.
    pub fn reset(&mut self) {
        let released = self.release_caches();
        self.nodes.clear();
        self.nodes.push(TreeNode::root());
        self.last_stats = TraversalStats::default();
        debug!(released, "tree reset");
    }

    /// Resets the tree, then grows it to `node_count` nodes.
    ///
    /// `choose_parent` receives the current max id and returns the parent
    /// for the next node (clamped like any other id). A count of 0 or 1
    /// leaves just the root.
    pub fn reset_with<F>(&mut self, node_count: usize, mut choose_parent: F)
    where
        F: FnMut(NodeId) -> i64,
    {
        self.reset();
        for _ in 1..node_count {
            let parent = choose_parent(self.max_id());
            self.insert_node(parent);
        }
    }

    fn release_caches(&self) -> usize {
        let mut released = 0;
        for cache in self.nodes.iter().filter_map(TreeNode::cache) {
            cache.lock().release();
            released += 1;
        }
        released
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        self.release_caches();
    }
}
