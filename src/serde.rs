//! Serde support for the persistent collections.
//!
//! Maps serialize as serde maps and sets as sequences, in iteration order:
//! trie order for the plain collections, sequence order for the sequenced
//! ones. Deserializing puts entries in the order read, so a duplicate key
//! keeps the last value seen and, in a sequenced map, the position of its
//! first occurrence.

use std::fmt;
use std::hash::Hash;
use std::iter;
use std::marker::PhantomData;

use ::serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use ::serde::ser::{Serialize, Serializer};

use crate::{
    ChampMap, ChampSet, FixedBuildHasher, MutableChampMap, MutableChampSet,
    MutableSequencedChampMap, MutableSequencedChampSet, SequencedChampMap, SequencedChampSet,
};

// ---------------------------------------------------------------------------
// Serialize
// ---------------------------------------------------------------------------

impl<K: Serialize, V: Serialize, S> Serialize for ChampMap<K, V, S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_map(self)
    }
}

impl<K: Serialize, V: Serialize, S> Serialize for SequencedChampMap<K, V, S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_map(self)
    }
}

impl<K: Serialize, S> Serialize for ChampSet<K, S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self)
    }
}

impl<K: Serialize, S> Serialize for SequencedChampSet<K, S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self)
    }
}

// ---------------------------------------------------------------------------
// Deserialize
// ---------------------------------------------------------------------------

/// Fills a mutable map `M` from a serde map.
struct MapVisitor<M, K, V> {
    marker: PhantomData<fn() -> (M, K, V)>,
}

impl<M, K, V> MapVisitor<M, K, V> {
    const fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

impl<'de, M, K, V> Visitor<'de> for MapVisitor<M, K, V>
where
    M: Default + Extend<(K, V)>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = M;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<M, A::Error> {
        let mut map = M::default();
        while let Some(entry) = access.next_entry()? {
            map.extend(iter::once(entry));
        }
        Ok(map)
    }
}

/// Fills a mutable set `M` from a serde sequence.
struct SetVisitor<M, K> {
    marker: PhantomData<fn() -> (M, K)>,
}

impl<M, K> SetVisitor<M, K> {
    const fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

impl<'de, M, K> Visitor<'de> for SetVisitor<M, K>
where
    M: Default + Extend<K>,
    K: Deserialize<'de>,
{
    type Value = M;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<M, A::Error> {
        let mut set = M::default();
        while let Some(key) = access.next_element()? {
            set.extend(iter::once(key));
        }
        Ok(set)
    }
}

impl<'de, K, V, S> Deserialize<'de> for ChampMap<K, V, S>
where
    K: Hash + Eq + Clone + Deserialize<'de>,
    V: Clone + PartialEq + Deserialize<'de>,
    S: FixedBuildHasher,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(MapVisitor::<MutableChampMap<K, V, S>, K, V>::new())
            .map(MutableChampMap::into_immutable)
    }
}

impl<'de, K, V, S> Deserialize<'de> for SequencedChampMap<K, V, S>
where
    K: Hash + Eq + Clone + Deserialize<'de>,
    V: Clone + PartialEq + Deserialize<'de>,
    S: FixedBuildHasher,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(MapVisitor::<MutableSequencedChampMap<K, V, S>, K, V>::new())
            .map(MutableSequencedChampMap::into_immutable)
    }
}

impl<'de, K, S> Deserialize<'de> for ChampSet<K, S>
where
    K: Hash + Eq + Clone + Deserialize<'de>,
    S: FixedBuildHasher,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_seq(SetVisitor::<MutableChampSet<K, S>, K>::new())
            .map(MutableChampSet::into_immutable)
    }
}

impl<'de, K, S> Deserialize<'de> for SequencedChampSet<K, S>
where
    K: Hash + Eq + Clone + Deserialize<'de>,
    S: FixedBuildHasher,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_seq(SetVisitor::<MutableSequencedChampSet<K, S>, K>::new())
            .map(MutableSequencedChampSet::into_immutable)
    }
}
