//! # subcache
//!
//! A mutable tree whose nodes can carry subtree caches: ordered records of
//! the preorder ids below them. Structural edits mark every cache above
//! the change dirty; collecting the tree's preorder rebuilds only dirty
//! caches and splices clean ones in without walking their subtrees.

pub mod cache;
pub mod error;
pub mod generator;
pub mod snapshot;
pub mod tree;

pub use cache::{CacheHandle, SubtreeCache};
pub use error::{Result, TreeError};
pub use generator::RandomTreeBuilder;
pub use snapshot::{CacheState, NodeSnapshot, TreeSnapshot};
pub use tree::{NodeId, TraversalStats, Tree, TreeNode, ROOT};
