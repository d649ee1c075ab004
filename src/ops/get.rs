//! Lookup operation: traverses the trie to find a key.

use std::borrow::Borrow;

use crate::node::{self, Cell, Entry, Node};

/// Searches for `key` in the subtree rooted at `node`.
///
/// Returns a reference to the entry if found.
pub fn find<'a, K, V, Q>(node: &'a Node<K, V>, hash: u32, key: &Q, shift: u32) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    match node {
        Node::Bitmap(bitmap) => {
            let bit = node::mask(node::fragment(hash, shift));
            match bitmap.cell(bit) {
                // A different key at this position cannot hide the one we
                // want: equal full hashes would have pushed both deeper.
                Cell::Data(entry) => {
                    (entry.hash == hash && entry.key.borrow() == key).then_some(entry)
                }
                Cell::Node(child) => find(child, hash, key, shift + node::BITS_PER_LEVEL),
                Cell::Empty => None,
            }
        }
        Node::Collision(collision) => {
            if hash != collision.hash {
                return None;
            }
            // Linear search through collision entries.
            collision.entries.iter().find(|e| e.key.borrow() == key)
        }
    }
}
