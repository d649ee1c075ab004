//! Persistent CHAMP set.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::hash::{self, DefaultHashBuilder, FixedBuildHasher};
use crate::iter::{Iter, SetIter};
use crate::mutable::MutableChampSet;
use crate::node::Entry;
use crate::raw::RawTrie;

/// Persistent hash set based on a CHAMP trie.
///
/// A set is a trie with unit values, so it shares every node algorithm
/// with [`ChampMap`](crate::ChampMap), including the node-level bulk
/// merges.
pub struct ChampSet<K, S = DefaultHashBuilder> {
    pub(crate) raw: RawTrie<K, ()>,
    hasher: PhantomData<fn() -> S>,
}

impl<K> ChampSet<K> {
    /// Creates an empty set using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, S> ChampSet<K, S> {
    pub(crate) const fn from_raw(raw: RawTrie<K, ()>) -> Self {
        Self {
            raw,
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

    /// Returns `true` if both sets share the same root node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.raw.ptr_eq(&other.raw)
    }

    /// Returns an iterator over the elements, in trie order.
    #[must_use]
    pub fn iter(&self) -> SetIter<'_, K> {
        SetIter {
            inner: Iter::new(&self.raw.root, self.raw.len),
        }
    }

    /// Returns the shape of the underlying trie.
    #[cfg(feature = "stats")]
    #[must_use]
    pub fn stats(&self) -> crate::TrieStats {
        crate::TrieStats::collect(&self.raw.root)
    }
}

impl<K, S: FixedBuildHasher> ChampSet<K, S> {
    /// Returns `true` if the set contains `key`.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns the stored element equal to `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.raw.get(hash::hash_key::<S, _>(key), key)?;
        Some(&entry.key)
    }
}

impl<K, S> ChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    /// Builds a set from `keys` through a transient.
    #[must_use]
    pub fn copy_of<I: IntoIterator<Item = K>>(keys: I) -> Self {
        Self::default().copy_add_each(keys)
    }

    /// Returns a set with `key` added.
    ///
    /// If `key` is already present, the result shares the receiver's root.
    #[must_use]
    pub fn copy_add(&self, key: K) -> Self {
        let mut raw = self.raw.clone();
        raw.put(Entry::new(hash::hash_key::<S, _>(&key), key, ()), None);
        Self::from_raw(raw)
    }

    /// Returns a set without `key`.
    #[must_use]
    pub fn copy_remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut raw = self.raw.clone();
        raw.remove(hash::hash_key::<S, _>(key), key, None);
        Self::from_raw(raw)
    }

    /// Returns the union of both sets.
    ///
    /// Elements already present keep the receiver's instance; `s.copy_add_all(&s)`
    /// returns `s` itself.
    #[must_use]
    pub fn copy_add_all(&self, other: &Self) -> Self {
        Self::from_raw(self.raw.union(&other.raw, None, &|_: &(), _: &()| false))
    }

    /// Returns a set with every element of `keys` added.
    #[must_use]
    pub fn copy_add_each<I: IntoIterator<Item = K>>(&self, keys: I) -> Self {
        let mut set = self.to_mutable();
        set.extend(keys);
        set.into_immutable()
    }

    /// Returns the intersection of both sets.
    #[must_use]
    pub fn copy_retain_all(&self, other: &Self) -> Self {
        Self::from_raw(self.raw.intersect(&other.raw, None))
    }

    /// Returns the elements of this set that are not in `other`.
    #[must_use]
    pub fn copy_remove_all(&self, other: &Self) -> Self {
        Self::from_raw(self.raw.difference(&other.raw, None))
    }

    /// Returns a set without any of the elements yielded by `keys`.
    #[must_use]
    pub fn copy_remove_each<'a, I>(&self, keys: I) -> Self
    where
        K: 'a,
        I: IntoIterator<Item = &'a K>,
    {
        let mut set = self.to_mutable();
        for key in keys {
            set.remove(key);
        }
        set.into_immutable()
    }

    /// Returns a set holding only the elements for which `keep` is `true`.
    #[must_use]
    pub fn copy_retain_if<F: FnMut(&K) -> bool>(&self, keep: F) -> Self {
        let mut set = self.to_mutable();
        set.retain(keep);
        set.into_immutable()
    }

    /// Returns an empty set, or the receiver if it is already empty.
    #[must_use]
    pub fn copy_clear(&self) -> Self {
        if self.is_empty() { self.clone() } else { Self::default() }
    }

    /// Returns a mutable view seeded with this set's elements.
    #[must_use]
    pub fn to_mutable(&self) -> MutableChampSet<K, S> {
        MutableChampSet::from_raw(self.raw.clone())
    }
}

impl<K, S> Clone for ChampSet<K, S> {
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone())
    }
}

impl<K, S> Default for ChampSet<K, S> {
    fn default() -> Self {
        Self::from_raw(RawTrie::new(None))
    }
}

impl<K: fmt::Debug, S> fmt::Debug for ChampSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq, S: FixedBuildHasher> PartialEq for ChampSet<K, S> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len() && self.iter().all(|k| other.contains(k)))
    }
}

impl<K: Hash + Eq, S: FixedBuildHasher> Eq for ChampSet<K, S> {}

impl<K: Hash, S: FixedBuildHasher> Hash for ChampSet<K, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(hash::unordered::<S, _, _, _>(Iter::new(
            &self.raw.root,
            self.raw.len,
        )));
    }
}

impl<K, S> FromIterator<K> for ChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        MutableChampSet::from_iter(iter).into_immutable()
    }
}

impl<'a, K, S> IntoIterator for &'a ChampSet<K, S> {
    type Item = &'a K;
    type IntoIter = SetIter<'a, K>;

    fn into_iter(self) -> SetIter<'a, K> {
        self.iter()
    }
}
