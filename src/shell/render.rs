//! Plain-text rendering of tree snapshots.

use std::fmt::Write;

use subcache::{CacheState, NodeId, TreeSnapshot};

pub const HEADER: &str = "[Current Tree Status]";

/// Terminal escape that clears the screen and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Renders the tree one node per line in preorder.
///
/// Children are indented two spaces per level below the first and
/// prefixed with `|_`. Cached nodes list their entries, flagged with
/// `[NeedsUpdate]` while dirty.
pub fn render_tree(snapshot: &TreeSnapshot) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for (depth, node) in snapshot.preorder() {
        if depth > 0 {
            out.push_str(&"  ".repeat(depth - 1));
            out.push_str("|_");
        }
        let _ = write!(out, "{}", node.id);

        match &node.cache {
            CacheState::None => {}
            CacheState::Attached { dirty, entries } => {
                if *dirty {
                    out.push_str(" [NeedsUpdate]");
                }
                out.push_str(" Cache:");
                out.push_str(&render_ids(entries));
            }
            CacheState::Dangling => out.push_str(" [Dropped]"),
        }
        out.push('\n');
    }

    out
}

/// Formats ids as `id|id|...|`.
pub fn render_ids(ids: &[NodeId]) -> String {
    ids.iter().fold(String::new(), |mut out, id| {
        let _ = write!(out, "{}|", id);
        out
    })
}
