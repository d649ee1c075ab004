//! Sequenced sets: CHAMP sets that remember the order of their elements.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::cursor::{Cursor, CursorTarget};
use crate::hash::{self, DefaultHashBuilder, FixedBuildHasher};
use crate::iter::{SeqIter, SeqSetIter};
use crate::ops::put::PutOutcome;
use crate::owner::OwnerToken;
use crate::sequenced::ReversedSet;
use crate::sequenced::data::{Position, SeqTrie};

// ---------------------------------------------------------------------------
// SequencedChampSet
// ---------------------------------------------------------------------------

/// Persistent hash set that iterates in insertion order.
pub struct SequencedChampSet<K, S = DefaultHashBuilder> {
    data: SeqTrie<K, ()>,
    hasher: PhantomData<fn() -> S>,
}

impl<K> SequencedChampSet<K> {
    /// Creates an empty set using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, S> SequencedChampSet<K, S> {
    const fn from_data(data: SeqTrie<K, ()>) -> Self {
        Self {
            data,
            hasher: PhantomData,
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns `true` if both sets share the same root nodes.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.data.ptr_eq(&other.data)
    }

    /// Returns an iterator over the elements, in sequence order.
    #[must_use]
    pub fn iter(&self) -> SeqSetIter<'_, K> {
        SeqSetIter {
            inner: SeqIter::new(self.data.ordered_pairs()),
        }
    }

    /// Returns a view with the sequence order reversed.
    #[must_use]
    pub const fn reversed(&self) -> ReversedSet<'_, K> {
        ReversedSet { data: &self.data }
    }
}

impl<K: Eq, S> SequencedChampSet<K, S> {
    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.data.first_entry().map(|entry| &entry.key)
    }

    /// Returns the last element.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.data.last_entry().map(|entry| &entry.key)
    }
}

impl<K, S: FixedBuildHasher> SequencedChampSet<K, S> {
    /// Returns `true` if the set contains `key`.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.get(hash::hash_key::<S, _>(key), key).is_some()
    }
}

impl<K, S> SequencedChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    fn updated(&self, update: impl FnOnce(&mut SeqTrie<K, ()>)) -> Self {
        let mut data = self.data.clone();
        update(&mut data);
        Self::from_data(data)
    }

    fn add_at(&self, key: K, position: Position) -> Self {
        self.updated(|data| {
            data.put(hash::hash_key::<S, _>(&key), key, (), position, None);
        })
    }

    /// Builds a set from `keys`, in the order given.
    #[must_use]
    pub fn copy_of<I: IntoIterator<Item = K>>(keys: I) -> Self {
        Self::default().copy_add_each(keys)
    }

    /// Returns a set with `key` appended, or the receiver itself if `key` is
    /// already present.
    #[must_use]
    pub fn copy_add(&self, key: K) -> Self {
        self.add_at(key, Position::Keep)
    }

    /// Returns a set with `key` at the front.
    #[must_use]
    pub fn copy_add_first(&self, key: K) -> Self {
        self.add_at(key, Position::First)
    }

    /// Returns a set with `key` at the back.
    #[must_use]
    pub fn copy_add_last(&self, key: K) -> Self {
        self.add_at(key, Position::Last)
    }

    /// Returns a set without `key`.
    #[must_use]
    pub fn copy_remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.updated(|data| {
            data.remove(hash::hash_key::<S, _>(key), key, None);
        })
    }

    /// Returns a set without its first element.
    #[must_use]
    pub fn copy_remove_first(&self) -> Self {
        self.updated(|data| {
            data.poll_first(None);
        })
    }

    /// Returns a set without its last element.
    #[must_use]
    pub fn copy_remove_last(&self) -> Self {
        self.updated(|data| {
            data.poll_last(None);
        })
    }

    /// Returns a set with the elements of `other` appended in `other`'s
    /// order; elements already present keep their position.
    #[must_use]
    pub fn copy_add_all(&self, other: &Self) -> Self {
        if self.ptr_eq(other) || other.is_empty() {
            return self.clone();
        }
        let mut set = self.to_mutable();
        set.add_all(other);
        set.into_immutable()
    }

    /// Returns a set with every element of `keys` added in order.
    #[must_use]
    pub fn copy_add_each<I: IntoIterator<Item = K>>(&self, keys: I) -> Self {
        let mut set = self.to_mutable();
        set.extend(keys);
        set.into_immutable()
    }

    /// Returns the elements of this set that are also in `other`, in this
    /// set's order.
    #[must_use]
    pub fn copy_retain_all(&self, other: &Self) -> Self {
        if self.ptr_eq(other) {
            return self.clone();
        }
        self.copy_retain_if(|key| other.contains(key))
    }

    /// Returns the elements of this set that are not in `other`.
    #[must_use]
    pub fn copy_remove_all(&self, other: &Self) -> Self {
        if self.ptr_eq(other) {
            return self.copy_clear();
        }
        self.copy_retain_if(|key| !other.contains(key))
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
    pub fn to_mutable(&self) -> MutableSequencedChampSet<K, S> {
        MutableSequencedChampSet::from_data(self.data.clone())
    }
}

impl<K, S> Clone for SequencedChampSet<K, S> {
    fn clone(&self) -> Self {
        Self::from_data(self.data.clone())
    }
}

impl<K, S> Default for SequencedChampSet<K, S> {
    fn default() -> Self {
        Self::from_data(SeqTrie::new(None))
    }
}

impl<K: fmt::Debug, S> fmt::Debug for SequencedChampSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Equality ignores order.
impl<K: Hash + Eq, S: FixedBuildHasher> PartialEq for SequencedChampSet<K, S> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len() && self.iter().all(|k| other.contains(k)))
    }
}

impl<K: Hash + Eq, S: FixedBuildHasher> Eq for SequencedChampSet<K, S> {}

impl<K: Hash, S: FixedBuildHasher> Hash for SequencedChampSet<K, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(hash::unordered::<S, _, _, _>(self.data.pairs()));
    }
}

impl<K, S> FromIterator<K> for SequencedChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        MutableSequencedChampSet::from_iter(iter).into_immutable()
    }
}

impl<'a, K, S> IntoIterator for &'a SequencedChampSet<K, S> {
    type Item = &'a K;
    type IntoIter = SeqSetIter<'a, K>;

    fn into_iter(self) -> SeqSetIter<'a, K> {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// MutableSequencedChampSet
// ---------------------------------------------------------------------------

/// Mutable counterpart of [`SequencedChampSet`].
pub struct MutableSequencedChampSet<K, S = DefaultHashBuilder> {
    data: SeqTrie<K, ()>,
    owner: OwnerToken,
    mod_count: u64,
    hasher: PhantomData<fn() -> S>,
}

impl<K> MutableSequencedChampSet<K> {
    /// Creates an empty set using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, S> MutableSequencedChampSet<K, S> {
    fn from_data(data: SeqTrie<K, ()>) -> Self {
        Self {
            data,
            owner: OwnerToken::new(),
            mod_count: 0,
            hasher: PhantomData,
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns an iterator over the elements, in sequence order.
    #[must_use]
    pub fn iter(&self) -> SeqSetIter<'_, K> {
        SeqSetIter {
            inner: SeqIter::new(self.data.ordered_pairs()),
        }
    }

    /// Returns a view with the sequence order reversed.
    #[must_use]
    pub const fn reversed(&self) -> ReversedSet<'_, K> {
        ReversedSet { data: &self.data }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.data = SeqTrie::new(Some(self.owner));
            self.bump();
        }
    }

    /// Returns an immutable snapshot and keeps the view usable.
    #[must_use]
    pub fn to_immutable(&mut self) -> SequencedChampSet<K, S> {
        self.owner = OwnerToken::new();
        SequencedChampSet::from_data(self.data.clone())
    }

    /// Consumes the view and returns its contents as an immutable set.
    #[must_use]
    pub fn into_immutable(self) -> SequencedChampSet<K, S> {
        SequencedChampSet::from_data(self.data)
    }

    const fn bump(&mut self) {
        self.mod_count = self.mod_count.wrapping_add(1);
    }
}

impl<K: Eq, S> MutableSequencedChampSet<K, S> {
    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.data.first_entry().map(|entry| &entry.key)
    }

    /// Returns the last element.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.data.last_entry().map(|entry| &entry.key)
    }
}

impl<K: Clone, S> MutableSequencedChampSet<K, S> {
    /// Returns a fail-fast cursor over a snapshot of the elements, in
    /// sequence order.
    #[must_use]
    pub fn cursor(&self) -> Cursor<K, ()> {
        let elements = self
            .data
            .ordered_pairs()
            .into_iter()
            .map(|(k, ())| (k.clone(), ()))
            .collect();
        Cursor::over_ordered(elements, self.mod_count)
    }
}

impl<K, S: FixedBuildHasher> MutableSequencedChampSet<K, S> {
    /// Returns `true` if the set contains `key`.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.get(hash::hash_key::<S, _>(key), key).is_some()
    }
}

impl<K, S> MutableSequencedChampSet<K, S>
where
    K: Hash + Eq + Clone,
    S: FixedBuildHasher,
{
    fn add_at(&mut self, key: K, position: Position) -> bool {
        let hash = hash::hash_key::<S, _>(&key);
        let outcome = self.data.put(hash, key, (), position, Some(self.owner));
        if outcome.is_modified() {
            self.bump();
        }
        matches!(outcome, PutOutcome::Inserted)
    }

    /// Appends `key` unless present. Returns `true` if it was added.
    pub fn add(&mut self, key: K) -> bool {
        self.add_at(key, Position::Keep)
    }

    /// Adds `key` or moves it to the front. Returns `true` if it was added.
    pub fn add_first(&mut self, key: K) -> bool {
        self.add_at(key, Position::First)
    }

    /// Adds `key` or moves it to the back. Returns `true` if it was added.
    pub fn add_last(&mut self, key: K) -> bool {
        self.add_at(key, Position::Last)
    }

    /// Removes `key`. Returns `true` if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self
            .data
            .remove(hash::hash_key::<S, _>(key), key, Some(self.owner))
            .is_some();
        if removed {
            self.bump();
        }
        removed
    }

    /// Removes and returns the first element.
    pub fn poll_first(&mut self) -> Option<K> {
        let (key, ()) = self.data.poll_first(Some(self.owner))?;
        self.bump();
        Some(key)
    }

    /// Removes and returns the last element.
    pub fn poll_last(&mut self) -> Option<K> {
        let (key, ()) = self.data.poll_last(Some(self.owner))?;
        self.bump();
        Some(key)
    }

    /// Appends the elements of `other` in `other`'s order. Returns `true` if
    /// the set changed.
    pub fn add_all(&mut self, other: &SequencedChampSet<K, S>) -> bool {
        let mut changed = false;
        for entry in other.data.ordered() {
            changed |= self.add_at(entry.key.clone(), Position::Keep);
        }
        changed
    }

    /// Keeps only the elements for which `keep` returns `true`.
    pub fn retain<F: FnMut(&K) -> bool>(&mut self, mut keep: F) {
        let doomed: Vec<K> = self.iter().filter(|k| !keep(k)).cloned().collect();
        for key in &doomed {
            self.remove(key);
        }
    }
}

impl<K, S> CursorTarget<K, ()> for MutableSequencedChampSet<K, S>
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

impl<K, S> Clone for MutableSequencedChampSet<K, S> {
    fn clone(&self) -> Self {
        Self::from_data(self.data.clone())
    }
}

impl<K, S> Default for MutableSequencedChampSet<K, S> {
    fn default() -> Self {
        let owner = OwnerToken::new();
        Self {
            data: SeqTrie::new(Some(owner)),
            owner,
            mod_count: 0,
            hasher: PhantomData,
        }
    }
}

impl<K: fmt::Debug, S> fmt::Debug for MutableSequencedChampSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, S> Extend<K> for MutableSequencedChampSet<K, S>
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

impl<K, S> FromIterator<K> for MutableSequencedChampSet<K, S>
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

impl<K, S> From<MutableSequencedChampSet<K, S>> for SequencedChampSet<K, S> {
    fn from(set: MutableSequencedChampSet<K, S>) -> Self {
        set.into_immutable()
    }
}

impl<'a, K, S> IntoIterator for &'a MutableSequencedChampSet<K, S> {
    type Item = &'a K;
    type IntoIter = SeqSetIter<'a, K>;

    fn into_iter(self) -> SeqSetIter<'a, K> {
        self.iter()
    }
}
