//! Insertion operation: owner-guarded put with path copying.
//!
//! Nodes the caller's token may edit are updated in place; every other node
//! on the path is copied only once a change below it is certain, so a put
//! that changes nothing leaves every handle untouched.

use std::mem;
use std::sync::Arc;

use crate::node::{self, Cell, Entry, Node, NodeRef};
use crate::owner::OwnerToken;

/// Decision of an update policy for a key that is already present.
pub enum Update<V> {
    /// Store this value in place of the old one.
    Replace(V),
    /// Leave the stored value alone; the rejected value is handed back.
    Keep(V),
}

/// Outcome of a put.
pub enum PutOutcome<V> {
    /// The key was new.
    Inserted,
    /// The key existed; its old value was replaced.
    Replaced(V),
    /// The key existed and the policy kept the stored value.
    Unchanged(V),
}

impl<V> PutOutcome<V> {
    /// `true` unless the trie was left untouched.
    pub const fn is_modified(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

/// Update policy of an ordinary put: replace unless the values are equal.
pub fn replace_if_changed<V: PartialEq>(old: &V, new: V) -> Update<V> {
    if *old == new {
        Update::Keep(new)
    } else {
        Update::Replace(new)
    }
}

/// Inserts `entry` into the subtree behind `slot`.
///
/// `update` decides what happens when the key is already present.
pub fn put<K, V, U>(
    slot: &mut NodeRef<K, V>,
    entry: Entry<K, V>,
    shift: u32,
    owner: Option<OwnerToken>,
    update: &mut U,
) -> PutOutcome<V>
where
    K: Eq + Clone,
    V: Clone,
    U: FnMut(&V, V) -> Update<V>,
{
    match &**slot {
        Node::Bitmap(_) => put_into_bitmap(slot, entry, shift, owner, update),
        Node::Collision(_) => put_into_collision(slot, entry, owner, update),
    }
}

// ---------------------------------------------------------------------------
// Bitmap node put
// ---------------------------------------------------------------------------

fn put_into_bitmap<K, V, U>(
    slot: &mut NodeRef<K, V>,
    entry: Entry<K, V>,
    shift: u32,
    owner: Option<OwnerToken>,
    update: &mut U,
) -> PutOutcome<V>
where
    K: Eq + Clone,
    V: Clone,
    U: FnMut(&V, V) -> Update<V>,
{
    let bit = node::mask(node::fragment(entry.hash, shift));
    let Node::Bitmap(bitmap) = &**slot else {
        unreachable!("put_into_bitmap on a collision node")
    };

    match bitmap.cell(bit) {
        Cell::Data(existing) if existing.hash == entry.hash && existing.key == entry.key => {
            // Same key → ask the policy.
            match update(&existing.value, entry.value) {
                Update::Keep(rejected) => PutOutcome::Unchanged(rejected),
                Update::Replace(value) => {
                    let target = node::edit_bitmap(slot, owner);
                    let pos = node::index(target.data_map, bit);
                    PutOutcome::Replaced(mem::replace(&mut target.data[pos].value, value))
                }
            }
        }
        Cell::Data(_) => {
            // Different key at same position → push both into a subtree.
            let target = node::edit_bitmap(slot, owner);
            let existing = target.remove_data(bit);
            let subtree = Node::pair(existing, entry, shift + node::BITS_PER_LEVEL, owner);
            target.insert_child(bit, Arc::new(subtree));
            PutOutcome::Inserted
        }
        Cell::Node(_) => {
            let next = shift + node::BITS_PER_LEVEL;
            if node::is_editable(slot, owner) {
                let target = node::edit_bitmap(slot, owner);
                let pos = node::index(target.node_map, bit);
                return put(&mut target.children[pos], entry, next, owner, update);
            }
            // Shared parent: work on a second handle to the child, so the
            // child is copied on change and the parent copied only then.
            let mut child = node::child_handle(slot, bit);
            let outcome = put(&mut child, entry, next, owner, update);
            if outcome.is_modified() {
                let target = node::edit_bitmap(slot, owner);
                let pos = node::index(target.node_map, bit);
                target.children[pos] = child;
            }
            outcome
        }
        Cell::Empty => {
            node::edit_bitmap(slot, owner).insert_data(bit, entry);
            PutOutcome::Inserted
        }
    }
}

// ---------------------------------------------------------------------------
// Collision node put
// ---------------------------------------------------------------------------

fn put_into_collision<K, V, U>(
    slot: &mut NodeRef<K, V>,
    entry: Entry<K, V>,
    owner: Option<OwnerToken>,
    update: &mut U,
) -> PutOutcome<V>
where
    K: Eq + Clone,
    V: Clone,
    U: FnMut(&V, V) -> Update<V>,
{
    let Node::Collision(collision) = &**slot else {
        unreachable!("put_into_collision on a bitmap node")
    };

    // Search for existing key.
    match collision.entries.iter().position(|e| e.key == entry.key) {
        Some(pos) => match update(&collision.entries[pos].value, entry.value) {
            Update::Keep(rejected) => PutOutcome::Unchanged(rejected),
            Update::Replace(value) => {
                let target = node::edit_collision(slot, owner);
                PutOutcome::Replaced(mem::replace(&mut target.entries[pos].value, value))
            }
        },
        None => {
            // Key not found → append.
            node::edit_collision(slot, owner).entries.push(entry);
            PutOutcome::Inserted
        }
    }
}
