//! Shared ownership handles for subtree caches.
//!
//! Callers own caches through [`CacheHandle`]. A tree only ever stores a
//! [`WeakCache`], so attaching a cache never extends its lifetime.

use super::subtree_cache::SubtreeCache;
use crate::tree::NodeId;
use parking_lot::{Mutex, MutexGuard};
use std::sync::{Arc, Weak};

/// Caller-owned handle to a [`SubtreeCache`].
///
/// Cloning the handle shares the same cache.
#[derive(Debug, Clone, Default)]
pub struct CacheHandle(Arc<Mutex<SubtreeCache>>);

impl CacheHandle {
    /// Allocates a new dirty, empty cache.
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(SubtreeCache::new())))
    }

    /// Locks the cache for direct access.
    ///
    /// Do not hold the guard across a call into the tree that references
    /// this cache.
    pub fn lock(&self) -> MutexGuard<'_, SubtreeCache> {
        self.0.lock()
    }

    pub fn is_dirty(&self) -> bool {
        self.0.lock().is_dirty()
    }

    /// Copies out the recorded entries.
    pub fn entries(&self) -> Vec<NodeId> {
        self.0.lock().entries().to_vec()
    }

    /// Returns true if both handles refer to the same cache.
    pub fn ptr_eq(&self, other: &CacheHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> WeakCache {
        WeakCache(Arc::downgrade(&self.0))
    }
}

/// Non-owning reference from a tree node to a cache.
#[derive(Debug, Clone)]
pub struct WeakCache(Weak<Mutex<SubtreeCache>>);

impl WeakCache {
    /// Returns the cache if some caller still owns it.
    pub fn upgrade(&self) -> Option<CacheHandle> {
        self.0.upgrade().map(CacheHandle)
    }

    /// Returns true if `handle` is the cache this reference points to.
    pub fn refers_to(&self, handle: &CacheHandle) -> bool {
        self.0.as_ptr() == Arc::as_ptr(&handle.0)
    }
}
