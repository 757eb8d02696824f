//! Error types for subtree cache operations.

use crate::tree::NodeId;
use thiserror::Error;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that can occur while mutating or traversing a tree.
///
/// Out-of-range node ids are never an error: they are clamped to the
/// nearest valid id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The cache is already attached to another node (or another tree).
    #[error("cache is already attached elsewhere; cannot attach it to node {node}")]
    CacheAlreadyAttached {
        /// Node the caller tried to attach the cache to.
        node: NodeId,
    },

    /// Every caller handle to the cache attached at this node was dropped.
    #[error("cache attached to node {node} was dropped by its owner")]
    DanglingCache {
        /// Node holding the dangling reference.
        node: NodeId,
    },
}
