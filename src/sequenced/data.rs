//! Sequence bookkeeping shared by the sequenced collections.
//!
//! Two tries back every sequenced collection: `entries` maps each key to
//! its value and sequence number, and `order` maps each sequence number
//! back to the key. The order trie hashes a sequence number as its own bit
//! pattern, so it needs no hasher and neighbouring numbers land in
//! neighbouring slots.
//!
//! `first` and `last` are exclusive bounds: live sequence numbers lie in
//! `first + 1 ..= last - 1`, and both bounds sit right next to a live entry
//! whenever the collection is non-empty. An empty collection starts at
//! `first = -1`, `last = 0`.

use std::borrow::Borrow;

use crate::iter::Iter;
use crate::node::Entry;
use crate::ops::put::{self, PutOutcome, Update};
use crate::owner::OwnerToken;
use crate::raw::RawTrie;

/// A value tagged with its sequence number.
#[derive(Clone, PartialEq)]
pub struct Sequenced<V> {
    pub seq: i32,
    pub value: V,
}

/// An order-index slot: the key living at one sequence number, with the
/// hash it is stored under in the entries trie.
#[derive(Clone)]
pub struct Slot<K> {
    pub hash: u32,
    pub key: K,
}

/// Where a put places its key in the sequence.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// New keys go last; existing keys stay where they are.
    Keep,
    /// Move or insert at the front.
    First,
    /// Move or insert at the back.
    Last,
}

/// Hash of a sequence number in the order trie.
const fn seq_hash(seq: i32) -> u32 {
    seq.cast_unsigned()
}

pub struct SeqTrie<K, V> {
    pub entries: RawTrie<K, Sequenced<V>>,
    pub order: RawTrie<i32, Slot<K>>,
    pub first: i32,
    pub last: i32,
}

impl<K, V> Clone for SeqTrie<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            order: self.order.clone(),
            first: self.first,
            last: self.last,
        }
    }
}

impl<K, V> SeqTrie<K, V> {
    pub fn new(owner: Option<OwnerToken>) -> Self {
        Self {
            entries: RawTrie::new(owner),
            order: RawTrie::new(owner),
            first: -1,
            last: 0,
        }
    }

    pub const fn len(&self) -> usize {
        self.entries.len
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.entries.ptr_eq(&other.entries) && self.order.ptr_eq(&other.order)
    }

    pub fn get<Q>(&self, hash: u32, key: &Q) -> Option<&Entry<K, Sequenced<V>>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries.get(hash, key)
    }

    /// The slot living at `seq`, if any.
    fn at(&self, seq: i32) -> Option<&Slot<K>> {
        self.order.get(seq_hash(seq), &seq).map(|entry| &entry.value)
    }

    fn entry_at(&self, seq: i32) -> Option<&Entry<K, Sequenced<V>>>
    where
        K: Eq,
    {
        let slot = self.at(seq)?;
        self.entries.get(slot.hash, &slot.key)
    }

    pub fn first_entry(&self) -> Option<&Entry<K, Sequenced<V>>>
    where
        K: Eq,
    {
        if self.len() == 0 {
            return None;
        }
        self.entry_at(self.first + 1)
    }

    pub fn last_entry(&self) -> Option<&Entry<K, Sequenced<V>>>
    where
        K: Eq,
    {
        if self.len() == 0 {
            return None;
        }
        self.entry_at(self.last - 1)
    }

    /// All entries in sequence order.
    ///
    /// Entries are dropped into buckets indexed by `seq - first - 1`; the
    /// span never exceeds four times the length, so this is linear.
    pub fn ordered(&self) -> Vec<&Entry<K, Sequenced<V>>> {
        let span = i64::from(self.last) - i64::from(self.first) - 1;
        let mut buckets: Vec<Option<&Entry<K, Sequenced<V>>>> =
            vec![None; usize::try_from(span).unwrap_or(0)];
        let mut walk = Iter::new(&self.entries.root, self.entries.len);
        while let Some(entry) = walk.next_entry() {
            let offset = i64::from(entry.value.seq) - i64::from(self.first) - 1;
            if let Some(bucket) = usize::try_from(offset).ok().and_then(|i| buckets.get_mut(i)) {
                *bucket = Some(entry);
            }
        }
        buckets.into_iter().flatten().collect()
    }

    /// All `(key, value)` pairs in trie order, for order-insensitive uses.
    pub fn pairs(&self) -> impl Iterator<Item = (&K, &V)> {
        Iter::new(&self.entries.root, self.entries.len).map(|(k, v)| (k, &v.value))
    }

    /// All `(key, value)` pairs in sequence order.
    pub fn ordered_pairs(&self) -> Vec<(&K, &V)> {
        self.ordered()
            .into_iter()
            .map(|entry| (&entry.key, &entry.value.value))
            .collect()
    }
}

impl<K: Eq + Clone, V: Clone + PartialEq> SeqTrie<K, V> {
    /// Puts `key` at `position`.
    ///
    /// A key that already sits at the requested end keeps its sequence
    /// number; so does any existing key under [`Position::Keep`].
    pub fn put(
        &mut self,
        hash: u32,
        key: K,
        value: V,
        position: Position,
        owner: Option<OwnerToken>,
    ) -> PutOutcome<V> {
        let current = self.entries.get(hash, &key).map(|entry| entry.value.seq);
        let Some(seq) = current else {
            let seq = self.claim(position);
            self.link(seq, hash, key.clone(), owner);
            self.entries
                .put_with(Entry::new(hash, key, Sequenced { seq, value }), owner, &mut replace);
            self.renumber_if_needed(owner);
            return PutOutcome::Inserted;
        };

        let stays = match position {
            Position::Keep => true,
            Position::First => seq == self.first + 1,
            Position::Last => seq == self.last - 1,
        };
        if stays {
            let entry = Entry::new(hash, key, Sequenced { seq, value });
            return unwrap_outcome(self.entries.put_with(entry, owner, &mut put::replace_if_changed));
        }

        self.unlink(seq, owner);
        let moved = self.claim(position);
        self.link(moved, hash, key.clone(), owner);
        let entry = Entry::new(hash, key, Sequenced { seq: moved, value });
        let outcome = self.entries.put_with(entry, owner, &mut replace);
        self.renumber_if_needed(owner);
        unwrap_outcome(outcome)
    }

    /// Removes `key`, returning the stored key and value.
    pub fn remove<Q>(&mut self, hash: u32, key: &Q, owner: Option<OwnerToken>) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let entry = self.entries.remove(hash, key, owner)?;
        self.unlink(entry.value.seq, owner);
        self.renumber_if_needed(owner);
        Some((entry.key, entry.value.value))
    }

    pub fn poll_first(&mut self, owner: Option<OwnerToken>) -> Option<(K, V)> {
        if self.len() == 0 {
            return None;
        }
        let slot = self.at(self.first + 1)?.clone();
        self.remove(slot.hash, &slot.key, owner)
    }

    pub fn poll_last(&mut self, owner: Option<OwnerToken>) -> Option<(K, V)> {
        if self.len() == 0 {
            return None;
        }
        let slot = self.at(self.last - 1)?.clone();
        self.remove(slot.hash, &slot.key, owner)
    }

    /// Takes the next free sequence number at the requested end.
    const fn claim(&mut self, position: Position) -> i32 {
        match position {
            Position::First => {
                let seq = self.first;
                self.first -= 1;
                seq
            }
            Position::Keep | Position::Last => {
                let seq = self.last;
                self.last += 1;
                seq
            }
        }
    }

    fn link(&mut self, seq: i32, hash: u32, key: K, owner: Option<OwnerToken>) {
        let slot = Entry::new(seq_hash(seq), seq, Slot { hash, key });
        self.order.put_with(slot, owner, &mut replace);
    }

    /// Drops `seq` from the order index and pulls a bound that touched it
    /// inwards to the next live entry.
    fn unlink(&mut self, seq: i32, owner: Option<OwnerToken>) {
        self.order.remove(seq_hash(seq), &seq, owner);
        if seq == self.first + 1 {
            self.first = seq;
            while self.first + 1 < self.last && self.at(self.first + 1).is_none() {
                self.first += 1;
            }
        }
        if seq == self.last - 1 {
            self.last = seq;
            while self.last - 1 > self.first && self.at(self.last - 1).is_none() {
                self.last -= 1;
            }
        }
    }

    fn needs_renumber(&self) -> bool {
        let len = self.len();
        if len == 0 {
            return self.first != -1 || self.last != 0;
        }
        let span = i64::from(self.last) - i64::from(self.first);
        let limit = i64::try_from(len).map_or(i64::MAX, |n| n.saturating_mul(4));
        self.last > i32::MAX - 2 || self.first < i32::MIN + 2 || span > limit
    }

    fn renumber_if_needed(&mut self, owner: Option<OwnerToken>) {
        if self.needs_renumber() {
            self.renumber(owner);
        }
    }

    /// Reassigns sequence numbers `0..len` in order.
    fn renumber(&mut self, owner: Option<OwnerToken>) {
        // Build through a transient even for persistent callers; the fresh
        // nodes are reachable from nowhere else yet.
        let build = owner.or_else(|| Some(OwnerToken::new()));
        let mut rebuilt = Self::new(build);
        let live: Vec<(u32, K, V)> = self
            .ordered()
            .into_iter()
            .map(|entry| (entry.hash, entry.key.clone(), entry.value.value.clone()))
            .collect();
        for (hash, key, value) in live {
            let seq = rebuilt.claim(Position::Last);
            rebuilt.link(seq, hash, key.clone(), build);
            rebuilt
                .entries
                .put_with(Entry::new(hash, key, Sequenced { seq, value }), build, &mut replace);
        }
        *self = rebuilt;
    }
}

/// Update policy that always stores the incoming value.
fn replace<V>(_: &V, new: V) -> Update<V> {
    Update::Replace(new)
}

fn unwrap_outcome<V>(outcome: PutOutcome<Sequenced<V>>) -> PutOutcome<V> {
    match outcome {
        PutOutcome::Inserted => PutOutcome::Inserted,
        PutOutcome::Replaced(old) => PutOutcome::Replaced(old.value),
        PutOutcome::Unchanged(rejected) => PutOutcome::Unchanged(rejected.value),
    }
}
