//! Single-owner mutable views over CHAMP tries.
//!
//! A mutable view holds a private [`OwnerToken`]. Nodes it creates are
//! stamped with that token and updated in place afterwards, as long as no
//! snapshot shares them; everything else is copied on first write. Freezing
//! a view shares its root with the snapshot and rotates the token, so the
//! snapshot can never be written through again.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::cursor::{Cursor, CursorTarget};
use crate::hash::{self, DefaultHashBuilder, FixedBuildHasher};
use crate::iter::{Iter, Keys, SetIter, Values};
use crate::map::ChampMap;
use crate::node::Entry;
use crate::ops::put::PutOutcome;
use crate::owner::OwnerToken;
use crate::raw::RawTrie;
use crate::set::ChampSet;

// ---------------------------------------------------------------------------
// MutableChampMap
// ---------------------------------------------------------------------------

/// Mutable hash map sharing its node types with [`ChampMap`].
///
/// Conversion in either direction is O(1): [`ChampMap::to_mutable`] and
/// [`to_immutable`](Self::to_immutable) only share a root handle.
///
/// A view is meant for one owner at a time. It is `Send` but carries no
/// locking; [`Clone`] yields an independent view with its own token.
pub struct MutableChampMap<K, V, S = DefaultHashBuilder> {
    raw: RawTrie<K, V>,
    owner: OwnerToken,
    mod_count: u64,
    hasher: PhantomData<fn() -> S>,
}

impl<K, V> MutableChampMap<K, V> {
    /// Creates an empty map using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S> MutableChampMap<K, V, S> {
    pub(crate) fn from_raw(raw: RawTrie<K, V>) -> Self {
        Self {
            raw,
            owner: OwnerToken::new(),
            mod_count: 0,
            hasher: PhantomData,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len == 0
    }

    /// Returns an iterator over `(&K, &V)` pairs, in trie order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw.root, self.raw.len)
    }

    /// Returns an iterator over the keys.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.raw = RawTrie::new(Some(self.owner));
            self.bump();
        }
    }

    /// Returns a fail-fast cursor over a snapshot of the current entries.
    #[must_use]
    pub fn cursor(&self) -> Cursor<K, V> {
        Cursor::over_trie(&self.raw.root, self.raw.len, self.mod_count)
    }

    /// Returns an immutable snapshot and keeps the view usable.
    ///
    /// O(1). The view's token is rotated, so later writes copy every node
    /// the snapshot can see.
    #[must_use]
    pub fn to_immutable(&mut self) -> ChampMap<K, V, S> {
        self.owner = OwnerToken::new();
        ChampMap::from_raw(self.raw.clone())
    }

    /// Consumes the view and returns its contents as an immutable map.
    #[must_use]
    pub fn into_immutable(self) -> ChampMap<K, V, S> {
        ChampMap::from_raw(self.raw)
    }

    /// Returns the shape of the underlying trie.
    #[cfg(feature = "stats")]
    #[must_use]
    pub fn stats(&self) -> crate::TrieStats {
        crate::TrieStats::collect(&self.raw.root)
    }

    const fn bump(&mut self) {
        self.mod_count = self.mod_count.wrapping_add(1);
    }
}

impl<K, V, S: FixedBuildHasher> MutableChampMap<K, V, S> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.raw.get(hash::hash_key::<S, _>(key), key)?;
        Some(&entry.value)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K, V, S> MutableChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    /// Maps `key` to `value`.
    ///
    /// Returns the previous value, or `None` if the key was new. Putting a
    /// value equal to the stored one leaves the map untouched.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let entry = Entry::new(hash::hash_key::<S, _>(&key), key, value);
        match self.raw.put(entry, Some(self.owner)) {
            PutOutcome::Inserted => {
                self.bump();
                None
            }
            PutOutcome::Replaced(old) => {
                self.bump();
                Some(old)
            }
            PutOutcome::Unchanged(same) => Some(same),
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self
            .raw
            .remove(hash::hash_key::<S, _>(key), key, Some(self.owner))?;
        self.bump();
        Some(removed.value)
    }

    /// Puts every entry of `other`; for a shared key `other`'s value wins.
    ///
    /// Returns `true` if the map changed.
    pub fn put_all(&mut self, other: &ChampMap<K, V, S>) -> bool {
        let merged = self.raw.union(&other.raw, Some(self.owner), &|ours: &V, theirs: &V| {
            ours != theirs
        });
        self.replace_raw(merged)
    }

    /// Removes the keys in `keys`. Returns `true` if the map changed.
    pub fn remove_all(&mut self, keys: &ChampSet<K, S>) -> bool {
        let rest = self.raw.difference(&keys.raw, Some(self.owner));
        self.replace_raw(rest)
    }

    /// Keeps only the keys in `keys`. Returns `true` if the map changed.
    pub fn retain_all(&mut self, keys: &ChampSet<K, S>) -> bool {
        let rest = self.raw.intersect(&keys.raw, Some(self.owner));
        self.replace_raw(rest)
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut keep: F) {
        let doomed: Vec<K> = self
            .iter()
            .filter(|(k, v)| !keep(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &doomed {
            self.remove(key);
        }
    }

    fn replace_raw(&mut self, raw: RawTrie<K, V>) -> bool {
        if raw.ptr_eq(&self.raw) {
            return false;
        }
        self.raw = raw;
        self.bump();
        true
    }
}

impl<K, V, S> CursorTarget<K, V> for MutableChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn mod_count(&self) -> u64 {
        self.mod_count
    }

    fn remove_key(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

impl<K, V, S> Clone for MutableChampMap<K, V, S> {
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone())
    }
}

impl<K, V, S> Default for MutableChampMap<K, V, S> {
    fn default() -> Self {
        let owner = OwnerToken::new();
        Self {
            raw: RawTrie::new(Some(owner)),
            owner,
            mod_count: 0,
            hasher: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for MutableChampMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for MutableChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for MutableChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> From<MutableChampMap<K, V, S>> for ChampMap<K, V, S> {
    fn from(map: MutableChampMap<K, V, S>) -> Self {
        map.into_immutable()
    }
}

impl<'a, K, V, S> IntoIterator for &'a MutableChampMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// MutableChampSet
// ---------------------------------------------------------------------------

/// Mutable hash set sharing its node types with [`ChampSet`].
pub struct MutableChampSet<K, S = DefaultHashBuilder> {
    raw: RawTrie<K, ()>,
    owner: OwnerToken,
    mod_count: u64,
    hasher: PhantomData<fn() -> S>,
}

impl<K> MutableChampSet<K> {
    /// Creates an empty set using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, S> MutableChampSet<K, S> {
    pub(crate) fn from_raw(raw: RawTrie<K, ()>) -> Self {
        Self {
            raw,
            owner: OwnerToken::new(),
            mod_count: 0,
            hasher: PhantomData,
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len == 0
    }

    /// Returns an iterator over the elements, in trie order.
    #[must_use]
    pub fn iter(&self) -> SetIter<'_, K> {
        SetIter {
            inner: Iter::new(&self.raw.root, self.raw.len),
        }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.raw = RawTrie::new(Some(self.owner));
            self.bump();
        }
    }

    /// Returns a fail-fast cursor over a snapshot of the current elements.
    #[must_use]
    pub fn cursor(&self) -> Cursor<K, ()> {
        Cursor::over_trie(&self.raw.root, self.raw.len, self.mod_count)
    }

    /// Returns an immutable snapshot and keeps the view usable.
    #[must_use]
    pub fn to_immutable(&mut self) -> ChampSet<K, S> {
        self.owner = OwnerToken::new();
        ChampSet::from_raw(self.raw.clone())
    }

    /// Consumes the view and returns its contents as an immutable set.
    #[must_use]
    pub fn into_immutable(self) -> ChampSet<K, S> {
        ChampSet::from_raw(self.raw)
    }

    /// Returns the shape of the underlying trie.
    #[cfg(feature = "stats")]
    #[must_use]
    pub fn stats(&self) -> crate::TrieStats {
        crate::TrieStats::collect(&self.raw.root)
    }

    const fn bump(&mut self) {
        self.mod_count = self.mod_count.wrapping_add(1);
    }
}

impl<K, S: FixedBuildHasher> MutableChampSet<K, S> {
    /// Returns `true` if the set contains `key`.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.get(hash::hash_key::<S, _>(key), key).is_some()
    }
}

impl<K, S> MutableChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    /// Adds `key`. Returns `true` if it was not present.
    pub fn add(&mut self, key: K) -> bool {
        let entry = Entry::new(hash::hash_key::<S, _>(&key), key, ());
        let added = matches!(self.raw.put(entry, Some(self.owner)), PutOutcome::Inserted);
        if added {
            self.bump();
        }
        added
    }

    /// Removes `key`. Returns `true` if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self
            .raw
            .remove(hash::hash_key::<S, _>(key), key, Some(self.owner))
            .is_some();
        if removed {
            self.bump();
        }
        removed
    }

    /// Adds every element of `other`. Returns `true` if the set changed.
    pub fn add_all(&mut self, other: &ChampSet<K, S>) -> bool {
        let merged = self.raw.union(&other.raw, Some(self.owner), &|_: &(), _: &()| false);
        self.replace_raw(merged)
    }

    /// Removes the elements of `other`. Returns `true` if the set changed.
    pub fn remove_all(&mut self, other: &ChampSet<K, S>) -> bool {
        let rest = self.raw.difference(&other.raw, Some(self.owner));
        self.replace_raw(rest)
    }

    /// Keeps only the elements of `other`. Returns `true` if the set
    /// changed.
    pub fn retain_all(&mut self, other: &ChampSet<K, S>) -> bool {
        let rest = self.raw.intersect(&other.raw, Some(self.owner));
        self.replace_raw(rest)
    }

    /// Keeps only the elements for which `keep` returns `true`.
    pub fn retain<F: FnMut(&K) -> bool>(&mut self, mut keep: F) {
        let doomed: Vec<K> = self.iter().filter(|k| !keep(k)).cloned().collect();
        for key in &doomed {
            self.remove(key);
        }
    }

    fn replace_raw(&mut self, raw: RawTrie<K, ()>) -> bool {
        if raw.ptr_eq(&self.raw) {
            return false;
        }
        self.raw = raw;
        self.bump();
        true
    }
}

impl<K, S> CursorTarget<K, ()> for MutableChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    fn mod_count(&self) -> u64 {
        self.mod_count
    }

    fn remove_key(&mut self, key: &K) -> Option<()> {
        self.remove(key).then_some(())
    }
}

impl<K, S> Clone for MutableChampSet<K, S> {
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone())
    }
}

impl<K, S> Default for MutableChampSet<K, S> {
    fn default() -> Self {
        let owner = OwnerToken::new();
        Self {
            raw: RawTrie::new(Some(owner)),
            owner,
            mod_count: 0,
            hasher: PhantomData,
        }
    }
}

impl<K: fmt::Debug, S> fmt::Debug for MutableChampSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, S> Extend<K> for MutableChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<K, S> FromIterator<K> for MutableChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<K, S> From<MutableChampSet<K, S>> for ChampSet<K, S> {
    fn from(set: MutableChampSet<K, S>) -> Self {
        set.into_immutable()
    }
}

impl<'a, K, S> IntoIterator for &'a MutableChampSet<K, S> {
    type Item = &'a K;
    type IntoIter = SetIter<'a, K>;

    fn into_iter(self) -> SetIter<'a, K> {
        self.iter()
    }
}
