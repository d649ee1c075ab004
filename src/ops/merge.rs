//! Node-to-node bulk merges: union, intersection, difference.
//!
//! Both operands must have been placed by the same hash function. Each merge
//! walks the 32 positions of two nodes at the same level and resolves the
//! pair of cell states (empty / data / node). Pointer-equal subtrees are
//! resolved without descending, and a merge that changes nothing returns
//! the receiver's own handle.

use std::ptr;
use std::sync::Arc;

use crate::node::{self, BitmapNode, Cell, CollisionNode, Entry, Node, NodeRef};
use crate::ops::get::find;
use crate::ops::put::{PutOutcome, Update, put};
use crate::ops::remove::remove;
use crate::owner::OwnerToken;

/// Result of a shrinking merge at one level.
pub enum Merged<K, V> {
    /// Nothing survived.
    Empty,
    /// One entry survived; the parent inlines it.
    Single(Entry<K, V>),
    /// A subtree survived.
    Node(NodeRef<K, V>),
}

impl<K, V> Merged<K, V> {
    /// Turns a level result into a root node.
    pub fn into_root(self, owner: Option<OwnerToken>) -> NodeRef<K, V> {
        match self {
            Self::Empty => Arc::new(Node::empty(owner)),
            Self::Single(entry) => Arc::new(Node::singleton(entry, owner)),
            Self::Node(root) => root,
        }
    }
}

/// `true` if both handles point at the same node, whatever their value types.
fn same_node<K, V, W>(a: &NodeRef<K, V>, b: &NodeRef<K, W>) -> bool {
    ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Canonicalizes a freshly built bitmap node.
fn finish<K, V>(mut out: BitmapNode<K, V>) -> Merged<K, V> {
    match (out.data.len(), out.children.len()) {
        (0, 0) => Merged::Empty,
        (1, 0) => Merged::Single(out.data.swap_remove(0)),
        _ => Merged::Node(Arc::new(Node::Bitmap(out))),
    }
}

/// Canonicalizes a filtered collision bucket.
fn finish_collision<K, V>(
    hash: u32,
    mut entries: Vec<Entry<K, V>>,
    owner: Option<OwnerToken>,
) -> Merged<K, V> {
    match entries.len() {
        0 => Merged::Empty,
        1 => Merged::Single(entries.swap_remove(0)),
        _ => Merged::Node(Arc::new(Node::Collision(CollisionNode { owner, hash, entries }))),
    }
}

// ---------------------------------------------------------------------------
// Union
// ---------------------------------------------------------------------------

/// Merges `that` into `this`.
///
/// For a key present on both sides, `prefer_that(this_value, that_value)`
/// decides whose value survives. `added` counts entries gained.
pub fn union<K, V, F>(
    this: &NodeRef<K, V>,
    that: &NodeRef<K, V>,
    shift: u32,
    owner: Option<OwnerToken>,
    prefer_that: &F,
    added: &mut usize,
) -> NodeRef<K, V>
where
    K: Eq + Clone,
    V: Clone,
    F: Fn(&V, &V) -> bool,
{
    if Arc::ptr_eq(this, that) {
        return Arc::clone(this);
    }
    match (&**this, &**that) {
        (Node::Bitmap(a), Node::Bitmap(b)) => {
            union_bitmap(this, a, b, shift, owner, prefer_that, added)
        }
        (Node::Collision(a), Node::Collision(b)) => {
            union_collision(this, a, b, owner, prefer_that, added)
        }
        _ => {
            // Nodes at one level always share a variant; fold entry by entry.
            let mut out = Arc::clone(this);
            for entry in entries_of(that) {
                put_preferring(&mut out, entry.clone(), shift, owner, prefer_that, added);
            }
            out
        }
    }
}

fn union_bitmap<K, V, F>(
    this: &NodeRef<K, V>,
    a: &BitmapNode<K, V>,
    b: &BitmapNode<K, V>,
    shift: u32,
    owner: Option<OwnerToken>,
    prefer_that: &F,
    added: &mut usize,
) -> NodeRef<K, V>
where
    K: Eq + Clone,
    V: Clone,
    F: Fn(&V, &V) -> bool,
{
    let next = shift + node::BITS_PER_LEVEL;
    let positions = a.data_map | a.node_map | b.data_map | b.node_map;
    let mut out = BitmapNode::empty(owner);
    let mut changed = false;

    for bit in node::bits(positions) {
        match (a.cell(bit), b.cell(bit)) {
            (Cell::Data(x), Cell::Empty) => out.push_data(bit, x.clone()),
            (Cell::Node(x), Cell::Empty) => out.push_child(bit, Arc::clone(x)),
            (Cell::Empty, Cell::Data(y)) => {
                out.push_data(bit, y.clone());
                *added += 1;
                changed = true;
            }
            (Cell::Empty, Cell::Node(y)) => {
                out.push_child(bit, Arc::clone(y));
                *added += y.size();
                changed = true;
            }
            (Cell::Data(x), Cell::Data(y)) if x.hash == y.hash && x.key == y.key => {
                if prefer_that(&x.value, &y.value) {
                    out.push_data(bit, y.clone());
                    changed = true;
                } else {
                    out.push_data(bit, x.clone());
                }
            }
            (Cell::Data(x), Cell::Data(y)) => {
                let pair = Node::pair(x.clone(), y.clone(), next, owner);
                out.push_child(bit, Arc::new(pair));
                *added += 1;
                changed = true;
            }
            (Cell::Data(x), Cell::Node(y)) => {
                // The other side brings a whole subtree; merge our one entry
                // into a copy of it with the roles of the policy swapped.
                let mut sub = Arc::clone(y);
                let outcome = put(&mut sub, x.clone(), next, owner, &mut |theirs: &V, ours: V| {
                    if prefer_that(&ours, theirs) {
                        Update::Keep(ours)
                    } else {
                        Update::Replace(ours)
                    }
                });
                let size = y.size();
                *added += match outcome {
                    PutOutcome::Inserted => size,
                    PutOutcome::Replaced(_) | PutOutcome::Unchanged(_) => size - 1,
                };
                out.push_child(bit, sub);
                changed = true;
            }
            (Cell::Node(x), Cell::Data(y)) => {
                let mut sub = Arc::clone(x);
                put_preferring(&mut sub, y.clone(), next, owner, prefer_that, added);
                changed |= !Arc::ptr_eq(&sub, x);
                out.push_child(bit, sub);
            }
            (Cell::Node(x), Cell::Node(y)) => {
                let sub = union(x, y, next, owner, prefer_that, added);
                changed |= !Arc::ptr_eq(&sub, x);
                out.push_child(bit, sub);
            }
            (Cell::Empty, Cell::Empty) => {}
        }
    }

    if changed {
        Arc::new(Node::Bitmap(out))
    } else {
        Arc::clone(this)
    }
}

fn union_collision<K, V, F>(
    this: &NodeRef<K, V>,
    a: &CollisionNode<K, V>,
    b: &CollisionNode<K, V>,
    owner: Option<OwnerToken>,
    prefer_that: &F,
    added: &mut usize,
) -> NodeRef<K, V>
where
    K: Eq + Clone,
    V: Clone,
    F: Fn(&V, &V) -> bool,
{
    let mut entries = a.entries.clone();
    let mut changed = false;
    for y in &b.entries {
        match entries.iter_mut().find(|x| x.key == y.key) {
            Some(x) => {
                if prefer_that(&x.value, &y.value) {
                    x.value = y.value.clone();
                    changed = true;
                }
            }
            None => {
                entries.push(y.clone());
                *added += 1;
                changed = true;
            }
        }
    }

    if changed {
        Arc::new(Node::Collision(CollisionNode { owner, hash: a.hash, entries }))
    } else {
        Arc::clone(this)
    }
}

/// Puts `entry` from the other operand into `slot` under the union policy.
fn put_preferring<K, V, F>(
    slot: &mut NodeRef<K, V>,
    entry: Entry<K, V>,
    shift: u32,
    owner: Option<OwnerToken>,
    prefer_that: &F,
    added: &mut usize,
) where
    K: Eq + Clone,
    V: Clone,
    F: Fn(&V, &V) -> bool,
{
    let outcome = put(slot, entry, shift, owner, &mut |ours: &V, theirs: V| {
        if prefer_that(ours, &theirs) {
            Update::Replace(theirs)
        } else {
            Update::Keep(theirs)
        }
    });
    if matches!(outcome, PutOutcome::Inserted) {
        *added += 1;
    }
}

// ---------------------------------------------------------------------------
// Intersection
// ---------------------------------------------------------------------------

/// Keeps the entries of `this` whose keys also occur in `that`.
///
/// `removed` counts entries dropped.
pub fn intersect<K, V, W>(
    this: &NodeRef<K, V>,
    that: &NodeRef<K, W>,
    shift: u32,
    owner: Option<OwnerToken>,
    removed: &mut usize,
) -> Merged<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    if same_node(this, that) {
        return Merged::Node(Arc::clone(this));
    }
    match (&**this, &**that) {
        (Node::Bitmap(a), Node::Bitmap(b)) => {
            let next = shift + node::BITS_PER_LEVEL;
            let mut out = BitmapNode::empty(owner);
            let mut changed = false;

            for bit in node::bits(a.data_map | a.node_map) {
                match (a.cell(bit), b.cell(bit)) {
                    (Cell::Data(x), Cell::Data(y)) if x.hash == y.hash && x.key == y.key => {
                        out.push_data(bit, x.clone());
                    }
                    (Cell::Data(x), Cell::Node(y))
                        if find(y, x.hash, &x.key, next).is_some() =>
                    {
                        out.push_data(bit, x.clone());
                    }
                    (Cell::Data(_), _) => {
                        *removed += 1;
                        changed = true;
                    }
                    (Cell::Node(x), Cell::Data(y)) => {
                        let size = x.size();
                        match find(x, y.hash, &y.key, next) {
                            Some(kept) => {
                                out.push_data(bit, kept.clone());
                                *removed += size - 1;
                            }
                            None => *removed += size,
                        }
                        changed = true;
                    }
                    (Cell::Node(x), Cell::Node(y)) => match intersect(x, y, next, owner, removed) {
                        Merged::Empty => changed = true,
                        Merged::Single(entry) => {
                            out.push_data(bit, entry);
                            changed = true;
                        }
                        Merged::Node(sub) => {
                            changed |= !Arc::ptr_eq(&sub, x);
                            out.push_child(bit, sub);
                        }
                    },
                    (Cell::Node(x), Cell::Empty) => {
                        *removed += x.size();
                        changed = true;
                    }
                    (Cell::Empty, _) => {}
                }
            }

            if changed { finish(out) } else { Merged::Node(Arc::clone(this)) }
        }
        (Node::Collision(a), Node::Collision(b)) => {
            let kept: Vec<Entry<K, V>> = a
                .entries
                .iter()
                .filter(|x| b.entries.iter().any(|y| y.key == x.key))
                .cloned()
                .collect();
            if kept.len() == a.entries.len() {
                return Merged::Node(Arc::clone(this));
            }
            *removed += a.entries.len() - kept.len();
            finish_collision(a.hash, kept, owner)
        }
        _ => {
            let mut out = Arc::clone(this);
            for entry in entries_of(this) {
                if find(that, entry.hash, &entry.key, shift).is_none() {
                    remove(&mut out, entry.hash, &entry.key, shift, owner);
                    *removed += 1;
                }
            }
            shrink(out)
        }
    }
}

// ---------------------------------------------------------------------------
// Difference
// ---------------------------------------------------------------------------

/// Keeps the entries of `this` whose keys do not occur in `that`.
///
/// `removed` counts entries dropped.
pub fn difference<K, V, W>(
    this: &NodeRef<K, V>,
    that: &NodeRef<K, W>,
    shift: u32,
    owner: Option<OwnerToken>,
    removed: &mut usize,
) -> Merged<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    if same_node(this, that) {
        *removed += this.size();
        return Merged::Empty;
    }
    match (&**this, &**that) {
        (Node::Bitmap(a), Node::Bitmap(b)) => {
            let next = shift + node::BITS_PER_LEVEL;
            let mut out = BitmapNode::empty(owner);
            let mut changed = false;

            for bit in node::bits(a.data_map | a.node_map) {
                match (a.cell(bit), b.cell(bit)) {
                    (Cell::Data(x), Cell::Data(y)) if x.hash == y.hash && x.key == y.key => {
                        *removed += 1;
                        changed = true;
                    }
                    (Cell::Data(x), Cell::Node(y))
                        if find(y, x.hash, &x.key, next).is_some() =>
                    {
                        *removed += 1;
                        changed = true;
                    }
                    (Cell::Data(x), _) => out.push_data(bit, x.clone()),
                    (Cell::Node(x), Cell::Data(y)) => {
                        let mut sub = Arc::clone(x);
                        if remove(&mut sub, y.hash, &y.key, next, owner).is_some() {
                            *removed += 1;
                            changed = true;
                            if sub.is_singleton() {
                                out.push_data(bit, Node::take_singleton(sub));
                                continue;
                            }
                        }
                        out.push_child(bit, sub);
                    }
                    (Cell::Node(x), Cell::Node(y)) => {
                        match difference(x, y, next, owner, removed) {
                            Merged::Empty => changed = true,
                            Merged::Single(entry) => {
                                out.push_data(bit, entry);
                                changed = true;
                            }
                            Merged::Node(sub) => {
                                changed |= !Arc::ptr_eq(&sub, x);
                                out.push_child(bit, sub);
                            }
                        }
                    }
                    (Cell::Node(x), Cell::Empty) => out.push_child(bit, Arc::clone(x)),
                    (Cell::Empty, _) => {}
                }
            }

            if changed { finish(out) } else { Merged::Node(Arc::clone(this)) }
        }
        (Node::Collision(a), Node::Collision(b)) => {
            let kept: Vec<Entry<K, V>> = a
                .entries
                .iter()
                .filter(|x| !b.entries.iter().any(|y| y.key == x.key))
                .cloned()
                .collect();
            if kept.len() == a.entries.len() {
                return Merged::Node(Arc::clone(this));
            }
            *removed += a.entries.len() - kept.len();
            finish_collision(a.hash, kept, owner)
        }
        _ => {
            let mut out = Arc::clone(this);
            for entry in entries_of(this) {
                if find(that, entry.hash, &entry.key, shift).is_some() {
                    remove(&mut out, entry.hash, &entry.key, shift, owner);
                    *removed += 1;
                }
            }
            shrink(out)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Collects the entries of a subtree.
fn entries_of<K, V>(root: &NodeRef<K, V>) -> Vec<&Entry<K, V>> {
    fn walk<'a, K, V>(node: &'a Node<K, V>, out: &mut Vec<&'a Entry<K, V>>) {
        for i in 0..node.data_len() {
            out.push(node.data_at(i));
        }
        for i in 0..node.children_len() {
            if let Some(child) = node.child_at(i) {
                walk(child, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

/// Classifies a node produced by per-entry removal.
fn shrink<K: Clone, V: Clone>(node: NodeRef<K, V>) -> Merged<K, V> {
    if node.data_len() + node.children_len() == 0 {
        Merged::Empty
    } else if node.is_singleton() {
        Merged::Single(Node::take_singleton(node))
    } else {
        Merged::Node(node)
    }
}
