//! Subtree caches and the handles used to share them with a tree.

pub mod handle;
pub mod subtree_cache;

// Re-export commonly used types
pub use handle::{CacheHandle, WeakCache};
pub use subtree_cache::SubtreeCache;
