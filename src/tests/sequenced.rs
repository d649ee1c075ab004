use std::hash::{DefaultHasher, Hash, Hasher};

use crate::hash::hash_key;
use crate::sequenced::data::{Position, SeqTrie};
use crate::{
    ChampSet, DefaultHashBuilder, MutableSequencedChampMap, MutableSequencedChampSet, SequencedChampMap,
    SequencedChampSet,
};

fn keys<V>(map: &SequencedChampMap<u32, V>) -> Vec<u32> {
    map.iter().map(|(k, _)| *k).collect()
}

fn one_to_ten() -> SequencedChampMap<u32, u32> {
    (1..=10).map(|i| (i, i * 10)).collect()
}

#[test]
fn iterates_in_insertion_order() {
    let keys_in = [42_u32, 7, 19, 3, 100, 56];
    let map: SequencedChampMap<u32, ()> = keys_in.iter().map(|k| (*k, ())).collect();
    assert_eq!(keys(&map), keys_in);
    assert_eq!(map.first(), Some((&42, &())));
    assert_eq!(map.last(), Some((&56, &())));
}

#[test]
fn put_keeps_position_of_existing_key() {
    let map = one_to_ten().copy_put(5, 0);
    assert_eq!(keys(&map), (1..=10).collect::<Vec<_>>());
    assert_eq!(map.get(&5), Some(&0));
}

#[test]
fn put_first_moves_key_to_front() {
    let map = one_to_ten().copy_put_first(5, 55);
    assert_eq!(keys(&map), [5, 1, 2, 3, 4, 6, 7, 8, 9, 10]);
    assert_eq!(map.first(), Some((&5, &55)));
}

#[test]
fn put_last_moves_key_to_back() {
    let map = one_to_ten().copy_put_last(1, 11);
    assert_eq!(keys(&map), [2, 3, 4, 5, 6, 7, 8, 9, 10, 1]);
    assert_eq!(map.last(), Some((&1, &11)));
}

#[test]
fn put_at_current_end_is_identity_when_equal() {
    let map = one_to_ten();
    assert!(map.copy_put_first(1, 10).ptr_eq(&map));
    assert!(map.copy_put_last(10, 100).ptr_eq(&map));
    assert!(map.copy_put(4, 40).ptr_eq(&map));
    assert!(!map.copy_put_first(2, 20).ptr_eq(&map));
}

#[test]
fn remove_first_and_last() {
    let map = one_to_ten().copy_remove_first().copy_remove_last();
    assert_eq!(keys(&map), (2..=9).collect::<Vec<_>>());
    assert_eq!(map.first(), Some((&2, &20)));
    assert_eq!(map.last(), Some((&9, &90)));

    let empty: SequencedChampMap<u32, u32> = SequencedChampMap::new();
    assert!(empty.copy_remove_first().is_empty());
    assert!(empty.copy_remove_last().ptr_eq(&empty));
}

#[test]
fn remove_middle_keeps_order() {
    let map = one_to_ten().copy_remove(&5).copy_remove(&6);
    assert_eq!(keys(&map), [1, 2, 3, 4, 7, 8, 9, 10]);
    assert!(map.copy_remove(&99).ptr_eq(&map));
}

#[test]
fn poll_drains_in_order() {
    let mut map = one_to_ten().to_mutable();
    map.put_first(0, 0);
    let mut front = Vec::new();
    while let Some((k, _)) = map.poll_first() {
        front.push(k);
        if let Some((k, _)) = map.poll_last() {
            front.push(k);
        }
    }
    assert_eq!(front, [0, 10, 1, 9, 2, 8, 3, 7, 4, 6, 5]);
    assert!(map.is_empty());
    assert_eq!(map.first(), None);
}

#[test]
fn ends_stay_exact_after_removals() {
    let mut map = one_to_ten().to_mutable();
    map.remove(&1);
    map.remove(&2);
    map.remove(&10);
    assert_eq!(map.first(), Some((&3, &30)));
    assert_eq!(map.last(), Some((&9, &90)));
    map.put_first(100, 0);
    map.put_last(200, 0);
    let order: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
    assert_eq!(order, [100, 3, 4, 5, 6, 7, 8, 9, 200]);
}

/// Shuffling keys between the ends many times forces renumbering.
#[test]
fn order_survives_renumbering() {
    let mut map: MutableSequencedChampMap<u32, u32> = (0..64).map(|i| (i, i)).collect();
    let mut expected: Vec<u32> = (0..64).collect();
    for round in 0..10_000_u32 {
        let key = (round * 37) % 64;
        if round % 2 == 0 {
            map.put_first(key, key);
            expected.retain(|k| *k != key);
            expected.insert(0, key);
        } else {
            map.put_last(key, key);
            expected.retain(|k| *k != key);
            expected.push(key);
        }
    }
    let order: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
    assert_eq!(order, expected);
    assert_eq!(map.len(), 64);
}

/// Growing far past one end and back again keeps order.
#[test]
fn long_one_sided_growth() {
    let mut map = MutableSequencedChampMap::new();
    for i in 0..5_000_u32 {
        map.put_first(i, ());
        if i % 3 == 0 {
            map.poll_last();
        }
    }
    let order: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
    let mut sorted = order.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(order, sorted);
    assert_eq!(map.first(), Some((&4_999, &())));
}

#[test]
fn reversed_view() {
    let map = one_to_ten();
    let reversed = map.reversed();
    assert_eq!(reversed.len(), 10);
    assert_eq!(reversed.first(), Some((&10, &100)));
    assert_eq!(reversed.last(), Some((&1, &10)));
    let order: Vec<u32> = reversed.iter().map(|(k, _)| *k).collect();
    assert_eq!(order, (1..=10).rev().collect::<Vec<_>>());
    assert_eq!((&reversed).into_iter().count(), 10);
}

#[test]
fn iterator_is_double_ended() {
    let map = one_to_ten();
    let mut iter = map.iter();
    assert_eq!(iter.len(), 10);
    assert_eq!(iter.next().map(|(k, _)| *k), Some(1));
    assert_eq!(iter.next_back().map(|(k, _)| *k), Some(10));
    assert_eq!(iter.len(), 8);
}

#[test]
fn equality_ignores_order() {
    let forward = one_to_ten();
    let backward: SequencedChampMap<u32, u32> = (1..=10).rev().map(|i| (i, i * 10)).collect();
    assert_ne!(keys(&forward), keys(&backward));
    assert_eq!(forward, backward);
    assert_ne!(forward, backward.copy_put(1, 0));
}

#[test]
fn put_all_appends_in_argument_order() {
    let base: SequencedChampMap<u32, u32> = [(1, 1), (2, 2)].into_iter().collect();
    let more: SequencedChampMap<u32, u32> = [(4, 4), (2, 20), (3, 3)].into_iter().collect();
    let merged = base.copy_put_all(&more);
    assert_eq!(keys(&merged), [1, 2, 4, 3]);
    assert_eq!(merged.get(&2), Some(&20));
    assert!(base.copy_put_all(&SequencedChampMap::new()).ptr_eq(&base));
}

#[test]
fn retain_and_remove_each() {
    let map = one_to_ten();
    let odd = map.copy_retain_if(|k, _| k % 2 == 1);
    assert_eq!(keys(&odd), [1, 3, 5, 7, 9]);
    let fewer = odd.copy_remove_each(&[3, 7]);
    assert_eq!(keys(&fewer), [1, 5, 9]);
    assert!(map.copy_clear().is_empty());
}

#[test]
fn index_and_contains() {
    let map = one_to_ten();
    assert_eq!(map[&3], 30);
    assert!(map.contains_key(&10));
    assert!(!map.contains_key(&11));
}

#[test]
fn debug_in_sequence_order() {
    let map: SequencedChampMap<u32, u32> = [(3, 0), (1, 0), (2, 0)].into_iter().collect();
    assert_eq!(format!("{map:?}"), "{3: 0, 1: 0, 2: 0}");
}

#[test]
fn frozen_snapshot_keeps_order() {
    let mut view = one_to_ten().to_mutable();
    let frozen = view.to_immutable();
    view.put_first(10, 0);
    view.remove(&1);
    assert_eq!(keys(&frozen), (1..=10).collect::<Vec<_>>());
    assert_eq!(view.iter().next().map(|(k, _)| *k), Some(10));
}

/// Puts keys `0..10` into a trie whose bounds start at `first`/`last`.
fn seeded(first: i32, last: i32, position: Position) -> SeqTrie<u32, u32> {
    let mut data = SeqTrie::new(None);
    data.first = first;
    data.last = last;
    for key in 0..10_u32 {
        data.put(hash_key::<DefaultHashBuilder, _>(&key), key, key, position, None);
    }
    data
}

fn trie_keys(data: &SeqTrie<u32, u32>) -> Vec<u32> {
    data.ordered_pairs().into_iter().map(|(k, _)| *k).collect()
}

#[test]
fn renumbers_before_last_overflows() {
    let data = seeded(i32::MAX - 5, i32::MAX - 4, Position::Keep);
    assert_eq!((data.first, data.last), (-1, 10));
    assert_eq!(trie_keys(&data), (0..10).collect::<Vec<_>>());
    assert_eq!(data.len(), 10);
}

#[test]
fn renumbers_before_first_underflows() {
    let data = seeded(i32::MIN + 4, i32::MIN + 5, Position::First);
    assert!(data.first > i32::MIN + 2);
    assert!(data.last < 20);
    assert_eq!(trie_keys(&data), (0..10).rev().collect::<Vec<_>>());
    assert_eq!(data.first_entry().map(|entry| entry.key), Some(9));
    assert_eq!(data.last_entry().map(|entry| entry.key), Some(0));
}

#[test]
fn remove_all_and_retain_all_keep_order() {
    let map = one_to_ten();
    let evens: ChampSet<u32> = (0..=10).step_by(2).collect();

    assert_eq!(keys(&map.copy_remove_all(&evens)), [1, 3, 5, 7, 9]);
    assert_eq!(keys(&map.copy_retain_all(&evens)), [2, 4, 6, 8, 10]);
    assert_eq!(map.copy_retain_all(&evens).get(&4), Some(&40));

    let strangers: ChampSet<u32> = (100..200).collect();
    assert!(map.copy_remove_all(&strangers).ptr_eq(&map));
    assert!(map.copy_remove_all(&ChampSet::new()).ptr_eq(&map));
    assert!(map.copy_retain_all(&strangers).is_empty());

    let all: ChampSet<u32> = (1..=10).collect();
    assert!(map.copy_retain_all(&all).ptr_eq(&map));
}

#[test]
fn mutable_remove_all_and_retain_all_report_changes() {
    let mut map = one_to_ten().to_mutable();
    let few: ChampSet<u32> = [2, 9, 50].into_iter().collect();
    assert!(map.remove_all(&few));
    assert!(!map.remove_all(&few));
    assert_eq!(map.iter().map(|(k, _)| *k).collect::<Vec<_>>(), [1, 3, 4, 5, 6, 7, 8, 10]);

    let many: ChampSet<u32> = (0..100).filter(|k| k % 3 != 0).collect();
    assert!(map.remove_all(&many));
    assert_eq!(map.iter().map(|(k, _)| *k).collect::<Vec<_>>(), [3, 6]);

    let keep: ChampSet<u32> = [6, 7].into_iter().collect();
    assert!(map.retain_all(&keep));
    assert!(!map.retain_all(&keep));
    assert_eq!(map.iter().map(|(k, _)| *k).collect::<Vec<_>>(), [6]);
}

#[test]
fn hash_ignores_order() {
    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }
    let forward = one_to_ten();
    let backward: SequencedChampMap<u32, u32> = (1..=10).rev().map(|i| (i, i * 10)).collect();
    assert_eq!(hash_of(&forward), hash_of(&backward));
    assert_ne!(hash_of(&forward), hash_of(&forward.copy_put(1, 0)));

    let set: SequencedChampSet<u32> = (0..50).collect();
    let shuffled: SequencedChampSet<u32> = (0..50).rev().collect();
    assert_eq!(hash_of(&set), hash_of(&shuffled));
}

#[test]
fn set_iterator_runs_backwards() {
    let set: SequencedChampSet<u32> = [5, 1, 4].into_iter().collect();
    assert_eq!(set.iter().rev().copied().collect::<Vec<_>>(), [4, 1, 5]);
    let mut iter = set.iter();
    assert_eq!(iter.next_back(), Some(&4));
    assert_eq!(iter.next(), Some(&5));
    assert_eq!(iter.next_back(), Some(&1));
    assert_eq!(iter.next(), None);
}

// ---------------------------------------------------------------------------
// Sets
// ---------------------------------------------------------------------------

#[test]
fn set_keeps_insertion_order() {
    let set: SequencedChampSet<&str> = ["c", "a", "b", "a"].into_iter().collect();
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), ["c", "a", "b"]);
    assert_eq!(set.first(), Some(&"c"));
    assert_eq!(set.last(), Some(&"b"));
    assert_eq!(set.reversed().iter().copied().collect::<Vec<_>>(), ["b", "a", "c"]);
}

#[test]
fn set_add_first_and_last() {
    let set: SequencedChampSet<u32> = (1..=5).collect();
    let moved = set.copy_add_first(3).copy_add_last(1);
    assert_eq!(moved.iter().copied().collect::<Vec<_>>(), [3, 2, 4, 5, 1]);
    assert!(set.copy_add(3).ptr_eq(&set));
    assert!(set.copy_add_first(1).ptr_eq(&set));
}

#[test]
fn set_bulk_operations_keep_order() {
    let set: SequencedChampSet<u32> = (1..=6).collect();
    let other: SequencedChampSet<u32> = [8, 2, 7].into_iter().collect();

    let union = set.copy_add_all(&other);
    assert_eq!(union.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 8, 7]);

    let both = set.copy_retain_all(&other);
    assert_eq!(both.iter().copied().collect::<Vec<_>>(), [2]);

    let only = set.copy_remove_all(&other);
    assert_eq!(only.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 6]);

    let trimmed = set.copy_remove_first().copy_remove_last();
    assert_eq!(trimmed.iter().copied().collect::<Vec<_>>(), [2, 3, 4, 5]);
}

#[test]
fn mutable_set_reports_changes() {
    let mut set = MutableSequencedChampSet::new();
    assert!(set.add(1));
    assert!(set.add(2));
    assert!(!set.add(1));
    assert!(!set.add_first(2));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [2, 1]);
    assert!(set.add_last(3));
    assert_eq!(set.poll_first(), Some(2));
    assert_eq!(set.poll_last(), Some(3));
    assert!(set.remove(&1));
    assert!(!set.remove(&1));
    assert_eq!(set.poll_first(), None);
}

#[test]
fn mutable_set_retain_and_clear() {
    let mut set: MutableSequencedChampSet<u32> = (0..20).collect();
    set.retain(|k| k % 4 == 0);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [0, 4, 8, 12, 16]);
    let other: SequencedChampSet<u32> = [1, 4].into_iter().collect();
    assert!(set.add_all(&other));
    assert_eq!(set.last(), Some(&1));
    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.into_immutable(), SequencedChampSet::new());
}
