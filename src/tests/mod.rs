mod canonical;
mod completeness;
mod persistence;
mod sequenced;
mod set;

use std::hash::{BuildHasherDefault, DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use crate::node::{self, Node, NodeRef};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Hash builder that keeps only the low `BITS` bits of SipHash, so keys
/// collide on purpose. `MaskedState<0>` sends every key to hash 0.
pub type MaskedState<const BITS: u32> = BuildHasherDefault<MaskedHasher<BITS>>;

#[derive(Default)]
pub struct MaskedHasher<const BITS: u32>(DefaultHasher);

impl<const BITS: u32> Hasher for MaskedHasher<BITS> {
    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }

    fn finish(&self) -> u64 {
        let hash = self.0.finish();
        if BITS >= 64 { hash } else { hash & ((1_u64 << BITS) - 1) }
    }
}

/// A key type with a controllable hash value for testing hash collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollidingKey {
    pub id: u32,
    pub forced_hash: u64,
}

impl CollidingKey {
    pub const fn new(id: u32, hash: u64) -> Self {
        Self {
            id,
            forced_hash: hash,
        }
    }
}

impl Hash for CollidingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.forced_hash.hash(state);
    }
}

/// Hash builder whose hasher reports the last `u64` written, unchanged.
///
/// Paired with [`CollidingKey`] it places keys at exactly the hash the test
/// asks for.
pub type IdentityState = BuildHasherDefault<IdentityHasher>;

#[derive(Default)]
pub struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = (self.0 << 8) | u64::from(byte);
        }
    }

    fn write_u64(&mut self, value: u64) {
        self.0 = value;
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Structure inspection
// ---------------------------------------------------------------------------

/// Walks the trie and asserts the structural invariants:
/// disjoint bitmaps, packed blocks, every entry under its hash prefix,
/// no inlinable singleton below the root, collision nodes only past the
/// deepest bitmap level.
pub fn check_invariants<K, V>(root: &Node<K, V>) -> usize {
    check_node(root, 0, 0, 0, true)
}

fn check_node<K, V>(node: &Node<K, V>, shift: u32, prefix: u32, mask: u32, is_root: bool) -> usize {
    match node {
        Node::Bitmap(b) => {
            assert_eq!(b.data_map & b.node_map, 0, "data_map and node_map overlap");
            assert_eq!(b.data.len(), b.data_map.count_ones() as usize);
            assert_eq!(b.children.len(), b.node_map.count_ones() as usize);
            if !is_root {
                assert!(
                    !(b.data.len() == 1 && b.children.is_empty()),
                    "singleton node below the root at shift {shift}"
                );
                assert!(!b.data.is_empty() || !b.children.is_empty(), "empty inner node");
            }
            for (entry, bit) in b.data.iter().zip(node::bits(b.data_map)) {
                assert_eq!(entry.hash & mask, prefix, "entry outside its prefix");
                assert_eq!(node::mask(node::fragment(entry.hash, shift)), bit);
            }
            let mut size = b.data.len();
            for (child, bit) in b.children.iter().zip(node::bits(b.node_map)) {
                let frag = bit.trailing_zeros();
                size += check_node(
                    child,
                    shift + node::BITS_PER_LEVEL,
                    prefix | (frag << shift),
                    mask | (0x1F << shift),
                    false,
                );
            }
            size
        }
        Node::Collision(c) => {
            assert!(shift > node::MAX_SHIFT, "collision node at shift {shift}");
            assert!(c.entries.len() >= 2, "collision node with fewer than two entries");
            assert!(c.entries.iter().all(|e| e.hash == c.hash));
            c.entries.len()
        }
    }
}

/// Pre-order dump of the trie shape: bitmaps of every bitmap node and the
/// size of every collision node. Equal contents give equal shapes.
pub fn shape<K, V>(root: &Node<K, V>) -> Vec<(u32, u32)> {
    fn walk<K, V>(node: &Node<K, V>, out: &mut Vec<(u32, u32)>) {
        match node {
            Node::Bitmap(b) => {
                out.push((b.data_map, b.node_map));
                for child in &b.children {
                    walk(child, out);
                }
            }
            Node::Collision(c) => out.push((u32::MAX, u32::try_from(c.entries.len()).unwrap())),
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

/// Counts the children of two roots that are the very same node.
pub fn shared_children<K, V>(a: &NodeRef<K, V>, b: &NodeRef<K, V>) -> (usize, usize) {
    match (&**a, &**b) {
        (Node::Bitmap(x), Node::Bitmap(y)) => {
            let shared = x
                .children
                .iter()
                .filter(|c| y.children.iter().any(|d| Arc::ptr_eq(c, d)))
                .count();
            (shared, x.children.len())
        }
        _ => (0, 0),
    }
}
