//! Random tree population for demos and property tests.
//!
//! Placement only goes through [`Tree::reset_with`], so generated trees
//! obey the same clamping and invalidation rules as hand-built ones.

use crate::tree::{NodeId, Tree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Grows trees by hanging each new node under a uniformly chosen
/// existing node.
pub struct RandomTreeBuilder {
    rng: StdRng,
}

impl RandomTreeBuilder {
    /// Creates a reproducible builder.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a builder seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Resets `tree` and fills it with `node_count` nodes, root included.
    pub fn populate(&mut self, tree: &mut Tree, node_count: usize) {
        let rng = &mut self.rng;
        tree.reset_with(node_count, |max_id: NodeId| rng.gen_range(0..=max_id) as i64);
        debug!(nodes = tree.len(), "generated random tree");
    }
}

impl Default for RandomTreeBuilder {
    fn default() -> Self {
        Self::from_entropy()
    }
}
