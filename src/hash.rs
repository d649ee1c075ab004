//! Key hashing and order-insensitive collection hashing.
//!
//! Keys are hashed with a default-constructed instance of the collection's
//! [`FixedBuildHasher`] and folded to the 32 bits the trie partitions on.
//! Whole collections hash as a wrapping sum of per-entry contributions, so
//! the result does not depend on iteration order.

use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hash builder used when a collection does not name one.
        ///
        /// Fixed-seed foldhash: every instance hashes identically, which
        /// node-level merges between two collections rely on.
        pub type DefaultHashBuilder = foldhash::fast::FixedState;
    } else {
        /// Hash builder used when a collection does not name one.
        ///
        /// The standard SipHash hasher with its fixed default keys.
        pub type DefaultHashBuilder = BuildHasherDefault<std::hash::DefaultHasher>;
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A [`BuildHasher`] whose default-constructed instances all hash alike.
///
/// Collections never store a hasher. They build one with `S::default()`
/// whenever a key needs hashing, and they merge two collections node
/// against node, trusting that both placed their keys the same way. Both
/// need every default instance to agree, which rules out randomly seeded
/// builders:
///
/// ```compile_fail
/// use std::hash::RandomState;
///
/// use champ_collections::ChampMap;
///
/// let map: ChampMap<u32, u32, RandomState> = (0..100).map(|i| (i, i)).collect();
/// ```
///
/// Implemented for [`BuildHasherDefault<H>`] with any `H: Hasher + Default`,
/// and for foldhash's fixed-seed states with the `foldhash` feature. A
/// custom hasher plugs in as `BuildHasherDefault<MyHasher>`. The trait is
/// sealed.
pub trait FixedBuildHasher: BuildHasher + Default + sealed::Sealed {}

impl<H: Hasher + Default> sealed::Sealed for BuildHasherDefault<H> {}
impl<H: Hasher + Default> FixedBuildHasher for BuildHasherDefault<H> {}

#[cfg(feature = "foldhash")]
impl sealed::Sealed for foldhash::fast::FixedState {}
#[cfg(feature = "foldhash")]
impl FixedBuildHasher for foldhash::fast::FixedState {}

#[cfg(feature = "foldhash")]
impl sealed::Sealed for foldhash::quality::FixedState {}
#[cfg(feature = "foldhash")]
impl FixedBuildHasher for foldhash::quality::FixedState {}

/// First mixing seed (golden ratio constant).
const SEED_1: u64 = 0x9E37_79B9_7F4A_7C15;

/// Second mixing seed (large prime).
const SEED_2: u64 = 0x517C_C1B7_2722_0A95;

/// Hashes `key` with a default-constructed `S` and folds it to 32 bits.
#[inline]
pub fn hash_key<S, Q>(key: &Q) -> u32
where
    S: FixedBuildHasher,
    Q: Hash + ?Sized,
{
    fold(S::default().hash_one(key))
}

/// Folds a 64-bit hash into the 32 bits consumed by the trie.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn fold(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}

/// Contribution of one entry to a collection hash.
///
/// `f(k, v) = key_hash · SEED₁ ⊕ value_hash · SEED₂`
#[must_use]
pub const fn entry_mix(key_hash: u64, value_hash: u64) -> u64 {
    key_hash.wrapping_mul(SEED_1) ^ value_hash.wrapping_mul(SEED_2)
}

/// Order-insensitive hash of a sequence of entries.
pub fn unordered<'a, S, K, V, I>(entries: I) -> u64
where
    S: FixedBuildHasher,
    K: Hash + 'a,
    V: Hash + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    let builder = S::default();
    entries.into_iter().fold(0_u64, |acc, (k, v)| {
        acc.wrapping_add(entry_mix(builder.hash_one(k), builder.hash_one(v)))
    })
}
