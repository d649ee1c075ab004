//! Trie shape statistics.
//!
//! Only compiled with the `stats` feature.

use crate::node::Node;

/// Shape of a trie, as reported by `stats()` on the collections.
///
/// Because the trie is canonical, two collections holding the same keys
/// under the same hasher report equal statistics regardless of history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieStats {
    /// Number of entries.
    pub entries: usize,
    /// Number of bitmap nodes, root included.
    pub bitmap_nodes: usize,
    /// Number of collision nodes.
    pub collision_nodes: usize,
    /// Entries stored inline in bitmap nodes.
    pub inline_entries: usize,
    /// Depth of the deepest node; the root is at depth 1.
    pub max_depth: usize,
}

impl TrieStats {
    pub(crate) fn collect<K, V>(root: &Node<K, V>) -> Self {
        let mut stats = Self::default();
        stats.visit(root, 1);
        stats
    }

    fn visit<K, V>(&mut self, node: &Node<K, V>, depth: usize) {
        self.max_depth = self.max_depth.max(depth);
        match node {
            Node::Bitmap(bitmap) => {
                self.bitmap_nodes += 1;
                self.inline_entries += bitmap.data.len();
                self.entries += bitmap.data.len();
                for child in &bitmap.children {
                    self.visit(child, depth + 1);
                }
            }
            Node::Collision(collision) => {
                self.collision_nodes += 1;
                self.entries += collision.entries.len();
            }
        }
    }
}
