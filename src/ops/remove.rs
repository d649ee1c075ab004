//! Removal operation: owner-guarded delete with canonical inlining.

use std::borrow::Borrow;

use crate::node::{self, Cell, Entry, Node, NodeRef};
use crate::owner::OwnerToken;

/// Removes `key` from the subtree behind `slot`, returning the removed entry.
///
/// A child left holding a single entry and no children is inlined into its
/// parent. The node behind `slot` itself is never collapsed here: the caller
/// either is a parent that inlines it, or holds the root, which may keep a
/// single entry.
pub fn remove<K, V, Q>(
    slot: &mut NodeRef<K, V>,
    hash: u32,
    key: &Q,
    shift: u32,
    owner: Option<OwnerToken>,
) -> Option<Entry<K, V>>
where
    K: Borrow<Q> + Clone,
    V: Clone,
    Q: Eq + ?Sized,
{
    match &**slot {
        Node::Bitmap(_) => remove_from_bitmap(slot, hash, key, shift, owner),
        Node::Collision(_) => remove_from_collision(slot, hash, key, owner),
    }
}

// ---------------------------------------------------------------------------
// Bitmap node remove
// ---------------------------------------------------------------------------

fn remove_from_bitmap<K, V, Q>(
    slot: &mut NodeRef<K, V>,
    hash: u32,
    key: &Q,
    shift: u32,
    owner: Option<OwnerToken>,
) -> Option<Entry<K, V>>
where
    K: Borrow<Q> + Clone,
    V: Clone,
    Q: Eq + ?Sized,
{
    let bit = node::mask(node::fragment(hash, shift));
    let Node::Bitmap(bitmap) = &**slot else {
        unreachable!("remove_from_bitmap on a collision node")
    };

    match bitmap.cell(bit) {
        Cell::Data(entry) => {
            if entry.hash != hash || entry.key.borrow() != key {
                return None;
            }
            Some(node::edit_bitmap(slot, owner).remove_data(bit))
        }
        Cell::Node(_) => {
            let next = shift + node::BITS_PER_LEVEL;
            if node::is_editable(slot, owner) {
                let target = node::edit_bitmap(slot, owner);
                let pos = node::index(target.node_map, bit);
                let removed = remove(&mut target.children[pos], hash, key, next, owner)?;
                if target.children[pos].is_singleton() {
                    inline_child(target, bit);
                }
                return Some(removed);
            }
            let mut child = node::child_handle(slot, bit);
            let removed = remove(&mut child, hash, key, next, owner)?;
            let target = node::edit_bitmap(slot, owner);
            let pos = node::index(target.node_map, bit);
            target.children[pos] = child;
            if target.children[pos].is_singleton() {
                inline_child(target, bit);
            }
            Some(removed)
        }
        Cell::Empty => None,
    }
}

/// Canonical form: replaces the singleton child at `bit` with its only entry.
fn inline_child<K: Clone, V: Clone>(target: &mut node::BitmapNode<K, V>, bit: u32) {
    let child = target.remove_child(bit);
    target.insert_data(bit, Node::take_singleton(child));
}

// ---------------------------------------------------------------------------
// Collision node remove
// ---------------------------------------------------------------------------

fn remove_from_collision<K, V, Q>(
    slot: &mut NodeRef<K, V>,
    hash: u32,
    key: &Q,
    owner: Option<OwnerToken>,
) -> Option<Entry<K, V>>
where
    K: Borrow<Q> + Clone,
    V: Clone,
    Q: Eq + ?Sized,
{
    let Node::Collision(collision) = &**slot else {
        unreachable!("remove_from_collision on a bitmap node")
    };
    if hash != collision.hash {
        return None;
    }

    let pos = collision.entries.iter().position(|e| e.key.borrow() == key)?;
    // A collision node left with one entry reports itself as a singleton and
    // is inlined by the parent.
    Some(node::edit_collision(slot, owner).entries.swap_remove(pos))
}
