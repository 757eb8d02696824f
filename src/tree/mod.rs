//! Tree of nodes with attachable subtree caches.
//!
//! This module provides:
//! - An arena of nodes with parent/child links by id
//! - Dirty propagation from a changed node up to the root
//! - Ordered preorder collection that reuses clean subtree caches
//!
//! # Example
//!
//! ```rust
//! use subcache::cache::CacheHandle;
//! use subcache::tree::Tree;
//!
//! let mut tree = Tree::new();
//! for _ in 0..3 {
//!     tree.insert_node(0);
//! }
//!
//! let cache = CacheHandle::new();
//! tree.attach_cache(1, &cache).unwrap();
//! assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 2, 3]);
//!
//! tree.insert_node(1);
//! assert!(cache.is_dirty());
//! assert_eq!(tree.collect_ordered().unwrap(), vec![0, 1, 4, 2, 3]);
//! assert_eq!(cache.entries(), vec![1, 4]);
//! ```

mod node;
mod traversal;
mod tree_state;

pub use node::{NodeId, TreeId, TreeNode, ROOT};
pub use traversal::TraversalStats;
pub use tree_state::Tree;
