//! Mutable views must report every change they make, and lose no data.

use crate::{MutableChampMap, MutableChampSet, MutableSequencedChampMap};

// ---------------------------------------------------------------------------
// put must return the old value when updating
// ---------------------------------------------------------------------------

#[test]
fn put_new_returns_none() {
    let mut map = MutableChampMap::new();
    let old = map.put("key", 42);
    assert_eq!(old, None, "putting a new key should return None");
}

#[test]
fn put_update_returns_old_value() {
    let mut map = MutableChampMap::new();
    map.put("key", 1);
    let old = map.put("key", 2);
    assert_eq!(old, Some(1), "updating should return the previous value");
}

#[test]
fn put_update_chain() {
    let mut map = MutableChampMap::new();
    assert_eq!(map.put("k", 10), None);
    assert_eq!(map.put("k", 20), Some(10));
    assert_eq!(map.put("k", 30), Some(20));
    assert_eq!(map.get(&"k"), Some(&30));
}

#[test]
fn put_equal_value_returns_it() {
    let mut map = MutableChampMap::new();
    map.put("k", 7);
    assert_eq!(map.put("k", 7), Some(7));
    assert_eq!(map.len(), 1);
}

// ---------------------------------------------------------------------------
// remove must return the removed value
// ---------------------------------------------------------------------------

#[test]
fn remove_existing_returns_value() {
    let mut map = MutableChampMap::new();
    map.put("a", 100);
    let removed = map.remove(&"a");
    assert_eq!(removed, Some(100), "remove should return the removed value");
}

#[test]
fn remove_missing_returns_none() {
    let mut map = MutableChampMap::new();
    map.put("a", 1);
    let removed = map.remove(&"z");
    assert_eq!(removed, None, "removing missing key should return None");
}

#[test]
fn remove_returns_correct_value_among_many() {
    let mut map = MutableChampMap::new();
    for i in 0..100 {
        map.put(i, i * 10);
    }
    assert_eq!(map.remove(&50), Some(500));
    assert_eq!(map.remove(&50), None);
    assert_eq!(map.len(), 99);
}

// ---------------------------------------------------------------------------
// Bulk operations report whether anything changed
// ---------------------------------------------------------------------------

#[test]
fn set_add_and_remove_report_change() {
    let mut set = MutableChampSet::new();
    assert!(set.add(1));
    assert!(!set.add(1));
    assert!(set.remove(&1));
    assert!(!set.remove(&1));
}

#[test]
fn bulk_operations_report_change() {
    let mut set: MutableChampSet<i32> = (0..10).collect();
    let evens: crate::ChampSet<i32> = (0..10).filter(|i| i % 2 == 0).collect();
    let far: crate::ChampSet<i32> = (100..110).collect();

    assert!(!set.add_all(&evens));
    assert!(!set.remove_all(&far));
    assert!(set.remove_all(&evens));
    assert_eq!(set.len(), 5);
    assert!(set.retain_all(&far));
    assert!(set.is_empty());
    assert!(set.add_all(&far));
    assert_eq!(set.len(), 10);
}

#[test]
fn map_put_all_reports_change() {
    let mut map: MutableChampMap<i32, i32> = (0..10).map(|i| (i, i)).collect();
    let same: crate::ChampMap<i32, i32> = (0..5).map(|i| (i, i)).collect();
    let changed: crate::ChampMap<i32, i32> = (0..5).map(|i| (i, -i)).collect();

    assert!(!map.put_all(&same));
    assert!(map.put_all(&changed));
    assert_eq!(map.get(&3), Some(&-3));
    assert_eq!(map.len(), 10);
}

#[test]
fn sequenced_put_and_poll_return_values() {
    let mut map = MutableSequencedChampMap::new();
    assert_eq!(map.put("a", 1), None);
    assert_eq!(map.put_first("b", 2), None);
    assert_eq!(map.put_last("a", 3), Some(1));
    assert_eq!(map.poll_first(), Some(("b", 2)));
    assert_eq!(map.poll_last(), Some(("a", 3)));
    assert_eq!(map.poll_last(), None);
    assert_eq!(map.poll_first(), None);
}
