//! Ordered collection of node ids with subtree cache memoization.
//!
//! The walk is depth-first preorder. A node without a cache writes its id
//! into the active cache. A node with a dirty cache opens a new active
//! cache, rebuilds it from its subtree, then splices it into the enclosing
//! one. A node with a clean cache is spliced directly and its subtree is
//! never entered.

use super::node::{NodeId, TreeNode, ROOT};
use super::tree_state::Tree;
use crate::cache::CacheHandle;
use crate::error::{Result, TreeError};
use tracing::{debug, trace};

/// Work counters of one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes whose visit step ran. Nodes inside reused subtrees are not
    /// counted.
    pub nodes_visited: usize,
    /// Dirty caches rebuilt from their subtree.
    pub caches_rebuilt: usize,
    /// Clean caches copied without descending.
    pub caches_reused: usize,
}

/// Stack of caches receiving ids during a traversal.
///
/// The bottom is the tree's result cache, so there is always a
/// destination to write to.
struct ActiveCaches<'a> {
    bottom: &'a CacheHandle,
    frames: Vec<CacheHandle>,
}

impl<'a> ActiveCaches<'a> {
    fn new(bottom: &'a CacheHandle) -> Self {
        Self {
            bottom,
            frames: Vec::new(),
        }
    }

    fn top(&self) -> &CacheHandle {
        self.frames.last().unwrap_or(self.bottom)
    }

    /// Resets `cache` and makes it the destination.
    fn begin(&mut self, cache: CacheHandle) {
        cache.lock().reset();
        self.frames.push(cache);
    }

    /// Finalizes the innermost cache and splices it into the one below.
    fn end(&mut self) -> Option<CacheHandle> {
        let cache = self.frames.pop()?;
        cache.lock().finalize();
        self.splice(&cache);
        Some(cache)
    }

    fn append(&self, id: NodeId) {
        self.top().lock().append(id);
    }

    /// Appends the entries of `source` to the destination. A cache is
    /// attached to a single node, so `source` is never the destination.
    fn splice(&self, source: &CacheHandle) {
        let source = source.lock();
        self.top().lock().append_all(&source);
    }
}

enum Step {
    Visit(NodeId),
    /// All children of the node owning the innermost cache are done.
    Close(NodeId),
}

impl Tree {
    /// Returns the depth-first preorder ids of the whole tree.
    ///
    /// Dirty caches met on the way are rebuilt and left clean; clean caches
    /// are copied without walking their subtree. The output never depends
    /// on where caches are attached.
    ///
    /// Fails with [`TreeError::DanglingCache`] if an attached cache was
    /// dropped by its owner. Caches that were mid-rebuild stay dirty.
    pub fn collect_ordered(&mut self) -> Result<Vec<NodeId>> {
        self.result.lock().mark_dirty();

        let mut active = ActiveCaches::new(&self.result);
        active.bottom.lock().reset();
        let stats = walk(&self.nodes, &mut active, ROOT)?;

        let mut result = self.result.lock();
        result.finalize();
        debug!(
            len = result.len(),
            visited = stats.nodes_visited,
            rebuilt = stats.caches_rebuilt,
            reused = stats.caches_reused,
            "collected ordered ids"
        );
        self.last_stats = stats;
        Ok(result.entries().to_vec())
    }
}

fn walk(nodes: &[TreeNode], active: &mut ActiveCaches<'_>, root: NodeId) -> Result<TraversalStats> {
    let mut stats = TraversalStats::default();
    let mut work = vec![Step::Visit(root)];

    while let Some(step) = work.pop() {
        match step {
            Step::Visit(id) => {
                let node = &nodes[id as usize];
                stats.nodes_visited += 1;

                let Some(weak) = node.cache_ref() else {
                    active.append(id);
                    push_children(&mut work, node);
                    continue;
                };
                let cache = weak.upgrade().ok_or(TreeError::DanglingCache { node: id })?;

                if cache.is_dirty() {
                    active.begin(cache);
                    active.append(id);
                    work.push(Step::Close(id));
                    push_children(&mut work, node);
                } else {
                    trace!(node = id, len = cache.lock().len(), "reused subtree cache");
                    active.splice(&cache);
                    stats.caches_reused += 1;
                }
            }
            Step::Close(id) => {
                if let Some(cache) = active.end() {
                    trace!(node = id, len = cache.lock().len(), "rebuilt subtree cache");
                    stats.caches_rebuilt += 1;
                }
            }
        }
    }

    Ok(stats)
}

/// Schedules children so they pop in stored order.
fn push_children(work: &mut Vec<Step>, node: &TreeNode) {
    work.extend(node.children().iter().rev().map(|&child| Step::Visit(child)));
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root 0 with children 1, 2, 3.
    fn four_node_tree() -> Tree {
        let mut tree = Tree::new();
        for _ in 0..3 {
            tree.insert_node(0);
        }
        tree
    }

    #[test]
    fn collects_preorder_without_caches() {
        let mut tree = four_node_tree();
        assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 2, 3]);

        let stats = tree.last_stats();
        assert_eq!(stats.nodes_visited, 4);
        assert_eq!(stats.caches_rebuilt, 0);
        assert_eq!(stats.caches_reused, 0);
    }

    #[test]
    fn single_root_tree() {
        let mut tree = Tree::new();
        assert_eq!(tree.collect_ordered().unwrap(), vec![0]);
    }

    #[test]
    fn rebuilds_dirty_cache_after_insert() {
        let mut tree = four_node_tree();
        let cache = CacheHandle::new();
        tree.attach_cache(1, &cache).unwrap();

        assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(cache.entries(), vec![1]);
        assert!(!cache.is_dirty());

        tree.insert_node(1);
        assert!(cache.is_dirty());

        assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 4, 2, 3]);
        assert!(!cache.is_dirty());
        assert_eq!(cache.entries(), vec![1, 4]);
    }

    #[test]
    fn clean_cache_skips_subtree() {
        let mut tree = Tree::new();
        let a = tree.insert_node(0);
        tree.insert_node(a as i64);
        tree.insert_node(a as i64);
        let cache = CacheHandle::new();
        tree.attach_cache(a as i64, &cache).unwrap();

        tree.collect_ordered().unwrap();
        assert_eq!(tree.last_stats().caches_rebuilt, 1);

        let second = tree.collect_ordered().unwrap();
        assert_eq!(second, vec![0, 1, 2, 3]);

        let stats = tree.last_stats();
        assert_eq!(stats.caches_rebuilt, 0);
        assert_eq!(stats.caches_reused, 1);
        // Root and the cached node only
        assert_eq!(stats.nodes_visited, 2);
    }

    #[test]
    fn clean_cache_contents_are_trusted() {
        let mut tree = four_node_tree();
        let cache = CacheHandle::new();
        tree.attach_cache(2, &cache).unwrap();
        tree.collect_ordered().unwrap();

        // Tampering with a clean cache shows up verbatim
        cache.lock().append(99);
        assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 2, 99, 3]);
    }

    #[test]
    fn nested_caches_compose() {
        // 0 -> 1 -> 2 -> 3, plus 4 under 1
        let mut tree = Tree::new();
        tree.insert_node(0);
        tree.insert_node(1);
        tree.insert_node(2);
        tree.insert_node(1);

        let outer = CacheHandle::new();
        let inner = CacheHandle::new();
        tree.attach_cache(1, &outer).unwrap();
        tree.attach_cache(2, &inner).unwrap();

        assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(outer.entries(), vec![1, 2, 3, 4]);
        assert_eq!(inner.entries(), vec![2, 3]);

        // Growing the inner subtree poisons both levels
        tree.insert_node(3);
        assert!(inner.is_dirty());
        assert!(outer.is_dirty());

        assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 2, 3, 5, 4]);
        assert_eq!(outer.entries(), vec![1, 2, 3, 5, 4]);
        assert_eq!(inner.entries(), vec![2, 3, 5]);
        assert_eq!(tree.last_stats().caches_rebuilt, 2);
    }

    #[test]
    fn dirty_outer_reuses_clean_inner() {
        let mut tree = Tree::new();
        tree.insert_node(0); // 1
        tree.insert_node(1); // 2
        tree.insert_node(2); // 3

        let outer = CacheHandle::new();
        let inner = CacheHandle::new();
        tree.attach_cache(1, &outer).unwrap();
        tree.attach_cache(2, &inner).unwrap();
        tree.collect_ordered().unwrap();

        // A sibling of the inner subtree only dirties the outer cache
        tree.insert_node(1);
        assert!(outer.is_dirty());
        assert!(!inner.is_dirty());

        assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 2, 3, 4]);
        let stats = tree.last_stats();
        assert_eq!(stats.caches_rebuilt, 1);
        assert_eq!(stats.caches_reused, 1);
    }

    #[test]
    fn dangling_cache_is_reported() {
        let mut tree = four_node_tree();
        let cache = CacheHandle::new();
        tree.attach_cache(2, &cache).unwrap();
        drop(cache);

        let err = tree.collect_ordered().unwrap_err();
        assert_eq!(err, TreeError::DanglingCache { node: 2 });
    }

    #[test]
    fn failed_traversal_leaves_open_caches_dirty() {
        let mut tree = Tree::new();
        let a = tree.insert_node(0);
        let b = tree.insert_node(a as i64);
        let outer = CacheHandle::new();
        let inner = CacheHandle::new();
        tree.attach_cache(a as i64, &outer).unwrap();
        tree.attach_cache(b as i64, &inner).unwrap();
        drop(inner);

        assert!(tree.collect_ordered().is_err());
        assert!(outer.is_dirty());

        // Replacing the dropped cache recovers
        let replacement = CacheHandle::new();
        tree.attach_cache(b as i64, &replacement).unwrap();
        assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 2]);
        assert!(!outer.is_dirty());
    }

    #[test]
    fn deep_chain_collects_in_order() {
        let mut tree = Tree::new();
        for parent in 0..10_000 {
            tree.insert_node(parent);
        }
        let ids = tree.collect_ordered().unwrap();
        assert_eq!(ids.len(), 10_001);
        assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
    }
}
