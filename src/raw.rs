//! Root handle plus entry count: the state every collection facade wraps.
//!
//! Hashes are computed by the facades; everything here works on
//! precomputed 32-bit hashes, which lets the sequenced layer key its order
//! index by the sequence number itself.

use std::borrow::Borrow;
use std::sync::Arc;

use crate::node::{Entry, Node, NodeRef};
use crate::ops::get::find;
use crate::ops::merge::{self, Merged};
use crate::ops::put::{self, PutOutcome, Update};
use crate::ops::remove::remove;
use crate::owner::OwnerToken;

/// A CHAMP trie: root node and number of entries.
pub struct RawTrie<K, V> {
    /// Root node; always a bitmap node.
    pub root: NodeRef<K, V>,
    /// Number of entries.
    pub len: usize,
}

impl<K, V> Clone for RawTrie<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            len: self.len,
        }
    }
}

impl<K, V> RawTrie<K, V> {
    /// Creates an empty trie whose root may be edited by `owner`.
    pub fn new(owner: Option<OwnerToken>) -> Self {
        Self {
            root: Arc::new(Node::empty(owner)),
            len: 0,
        }
    }

    /// `true` if both tries share the same root node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Looks up the entry for `key`.
    pub fn get<Q>(&self, hash: u32, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        find(&self.root, hash, key, 0)
    }
}

impl<K: Eq + Clone, V: Clone> RawTrie<K, V> {
    /// Inserts `entry`; `update` decides the fate of an existing value.
    pub fn put_with<U>(&mut self, entry: Entry<K, V>, owner: Option<OwnerToken>, update: &mut U) -> PutOutcome<V>
    where
        U: FnMut(&V, V) -> Update<V>,
    {
        let outcome = put::put(&mut self.root, entry, 0, owner, update);
        if matches!(outcome, PutOutcome::Inserted) {
            self.len += 1;
        }
        outcome
    }

    /// Inserts `entry`, replacing an existing value unless it is equal.
    pub fn put(&mut self, entry: Entry<K, V>, owner: Option<OwnerToken>) -> PutOutcome<V>
    where
        V: PartialEq,
    {
        self.put_with(entry, owner, &mut put::replace_if_changed)
    }

    /// Removes the entry for `key`.
    pub fn remove<Q>(&mut self, hash: u32, key: &Q, owner: Option<OwnerToken>) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let removed = remove(&mut self.root, hash, key, 0, owner)?;
        self.len -= 1;
        Some(removed)
    }

    /// Adds every entry of `other`; on shared keys `prefer_that(ours, theirs)`
    /// picks the surviving value.
    pub fn union<F>(&self, other: &Self, owner: Option<OwnerToken>, prefer_that: &F) -> Self
    where
        F: Fn(&V, &V) -> bool,
    {
        if other.len == 0 {
            return self.clone();
        }
        if self.len == 0 {
            return other.clone();
        }
        let mut added = 0;
        let root = merge::union(&self.root, &other.root, 0, owner, prefer_that, &mut added);
        Self {
            root,
            len: self.len + added,
        }
    }

    /// Keeps the entries whose keys occur in `other`.
    pub fn intersect<W>(&self, other: &RawTrie<K, W>, owner: Option<OwnerToken>) -> Self {
        if self.len == 0 {
            return self.clone();
        }
        if other.len == 0 {
            return Self::new(owner);
        }
        let mut removed = 0;
        let merged = merge::intersect(&self.root, &other.root, 0, owner, &mut removed);
        self.rebuilt(merged, removed, owner)
    }

    /// Keeps the entries whose keys do not occur in `other`.
    pub fn difference<W>(&self, other: &RawTrie<K, W>, owner: Option<OwnerToken>) -> Self {
        if other.len == 0 || self.len == 0 {
            return self.clone();
        }
        let mut removed = 0;
        let merged = merge::difference(&self.root, &other.root, 0, owner, &mut removed);
        self.rebuilt(merged, removed, owner)
    }

    fn rebuilt(&self, merged: Merged<K, V>, removed: usize, owner: Option<OwnerToken>) -> Self {
        match merged {
            Merged::Node(root) if Arc::ptr_eq(&root, &self.root) => self.clone(),
            merged => Self {
                root: merged.into_root(owner),
                len: self.len - removed,
            },
        }
    }
}
