use std::sync::Arc;

use super::shared_children;
use crate::hash;
use crate::node::Entry;
use crate::owner::OwnerToken;
use crate::raw::RawTrie;
use crate::{ChampMap, ChampSet, DefaultHashBuilder, MutableChampMap};

/// Older versions survive every later update.
#[test]
fn snapshots_survive_updates() {
    let v1 = ChampMap::new().copy_put(1, 10).copy_put(2, 20);
    let v2 = v1.copy_put(3, 30).copy_put(4, 40);
    let v3 = v2.copy_remove(&1);

    assert_eq!(v1.len(), 2);
    assert_eq!(v1.get(&3), None);
    assert_eq!(v2.len(), 4);
    assert_eq!(v2.get(&1), Some(&10));
    assert_eq!(v3.len(), 3);
    assert_eq!(v3.get(&1), None);
}

/// An update copies one path; every other root child is shared.
#[test]
fn put_shares_untouched_children() {
    let map: ChampMap<u32, u32> = (0..10_000).map(|i| (i, i)).collect();
    let next = map.copy_put(10_000, 0);

    let (shared, total) = shared_children(&map.raw.root, &next.raw.root);
    assert_eq!(total, 32);
    assert!(shared >= total - 1, "only {shared} of {total} children shared");
}

#[test]
fn remove_shares_untouched_children() {
    let map: ChampMap<u32, u32> = (0..10_000).map(|i| (i, i)).collect();
    let next = map.copy_remove(&5_000);

    let (shared, total) = shared_children(&map.raw.root, &next.raw.root);
    assert!(shared >= total - 1);
}

// ---------------------------------------------------------------------------
// Identity on no-op updates
// ---------------------------------------------------------------------------

#[test]
fn put_equal_value_is_identity() {
    let map: ChampMap<u32, String> = (0..1_000).map(|i| (i, i.to_string())).collect();
    let same = map.copy_put(500, String::from("500"));
    assert!(same.ptr_eq(&map));
    let changed = map.copy_put(500, String::from("five hundred"));
    assert!(!changed.ptr_eq(&map));
}

#[test]
fn add_existing_is_identity() {
    let set: ChampSet<u32> = (0..1_000).collect();
    assert!(set.copy_add(999).ptr_eq(&set));
    assert!(set.copy_remove(&5_000).ptr_eq(&set));
}

#[test]
fn merges_with_self_are_identity() {
    let set: ChampSet<u32> = (0..1_000).collect();
    assert!(set.copy_add_all(&set).ptr_eq(&set));
    assert!(set.copy_retain_all(&set).ptr_eq(&set));
    assert!(set.copy_remove_all(&set).is_empty());

    let map: ChampMap<u32, u32> = (0..1_000).map(|i| (i, i)).collect();
    assert!(map.copy_put_all(&map).ptr_eq(&map));
}

#[test]
fn merges_with_empty_are_identity() {
    let set: ChampSet<u32> = (0..100).collect();
    let empty = ChampSet::new();
    assert!(set.copy_add_all(&empty).ptr_eq(&set));
    assert!(set.copy_remove_all(&empty).ptr_eq(&set));
    assert!(empty.copy_add_all(&set).ptr_eq(&set));
    assert!(set.copy_retain_all(&empty).is_empty());
}

#[test]
fn merge_with_subset_is_identity() {
    let set: ChampSet<u32> = (0..1_000).collect();
    let subset: ChampSet<u32> = (0..1_000).step_by(7).collect();
    let disjoint: ChampSet<u32> = (5_000..6_000).collect();

    assert!(set.copy_add_all(&subset).ptr_eq(&set));
    assert!(subset.copy_retain_all(&set).ptr_eq(&subset));
    assert!(set.copy_remove_all(&disjoint).ptr_eq(&set));
}

#[test]
fn retain_everything_is_identity() {
    let map: ChampMap<u32, u32> = (0..1_000).map(|i| (i, i)).collect();
    assert!(map.copy_retain_if(|_, _| true).ptr_eq(&map));
    let keys: ChampSet<u32> = (0..2_000).collect();
    assert!(map.copy_retain_all(&keys).ptr_eq(&map));
}

// ---------------------------------------------------------------------------
// Mutable views
// ---------------------------------------------------------------------------

/// Thawing is O(1) and never disturbs the source.
#[test]
fn thaw_does_not_touch_source() {
    let map: ChampMap<u32, u32> = (0..1_000).map(|i| (i, i)).collect();
    let mut view = map.to_mutable();
    for i in 0..1_000 {
        view.put(i, i + 1);
    }
    view.remove(&0);

    assert_eq!(map.len(), 1_000);
    assert!((0..1_000).all(|i| map.get(&i) == Some(&i)));
    assert_eq!(view.len(), 999);
    assert_eq!(view.get(&1), Some(&2));
}

/// Freezing hands out a snapshot; later writes copy instead of mutating it.
#[test]
fn frozen_snapshot_is_stable() {
    let mut view = MutableChampMap::new();
    for i in 0_u32..10_000 {
        view.put(i, i);
    }
    let frozen = view.to_immutable();
    for i in 0_u32..10_000 {
        view.put(i, i * 2);
    }
    for i in 0_u32..5_000 {
        view.remove(&i);
    }

    assert_eq!(frozen.len(), 10_000);
    assert!((0_u32..10_000).all(|i| frozen.get(&i) == Some(&i)));
    assert_eq!(view.len(), 5_000);
    assert_eq!(view.get(&9_999), Some(&19_998));
}

/// A transient edits nodes it owns in place, and copies once they are shared.
#[test]
fn owned_nodes_are_edited_in_place() {
    let owner = Some(OwnerToken::new());
    let entry = |k: u32| Entry::new(hash::hash_key::<DefaultHashBuilder, _>(&k), k, k);
    let mut raw = RawTrie::new(owner);
    for i in 0..64 {
        raw.put(entry(i), owner);
    }
    let root = Arc::as_ptr(&raw.root);
    raw.put(entry(64), owner);
    assert_eq!(Arc::as_ptr(&raw.root), root);

    let snapshot = raw.clone();
    raw.put(entry(65), owner);
    assert_ne!(Arc::as_ptr(&raw.root), Arc::as_ptr(&snapshot.root));
    assert_eq!(snapshot.len, 65);
    assert_eq!(raw.len, 66);

    let mut persistent = snapshot.clone();
    persistent.put(entry(66), None);
    assert!(!persistent.ptr_eq(&snapshot));
}

/// A clone of a view gets its own owner; edits through either stay private.
#[test]
fn cloned_views_are_independent() {
    let mut a: MutableChampMap<u32, u32> = (0..500).map(|i| (i, i)).collect();
    let mut b = a.clone();
    a.put(0, 100);
    b.remove(&0);

    assert_eq!(a.get(&0), Some(&100));
    assert_eq!(b.get(&0), None);
    assert_eq!(a.len(), 500);
    assert_eq!(b.len(), 499);
}

/// Freezing, thawing and freezing again keeps every generation intact.
#[test]
fn repeated_freeze_thaw() {
    let mut generations = Vec::new();
    let mut map: ChampMap<u32, u32> = ChampMap::new();
    for round in 0..10_u32 {
        let mut view = map.to_mutable();
        for i in 0..1_000 {
            view.put(round * 1_000 + i, round);
        }
        map = view.into_immutable();
        generations.push(map.clone());
    }

    for (round, snapshot) in generations.iter().enumerate() {
        assert_eq!(snapshot.len(), (round + 1) * 1_000);
    }
    assert_eq!(map.get(&9_999), Some(&9));
}

/// A union with an independently built equal set is equal to the receiver.
#[test]
fn union_with_equal_copy() {
    let set: ChampSet<u32> = (0..1_000).collect();
    let copy: ChampSet<u32> = ChampSet::copy_of((0..1_000).rev());
    assert!(!copy.ptr_eq(&set));
    let union = set.copy_add_all(&copy);
    assert_eq!(union, set);
    assert!(union.ptr_eq(&set));
}
