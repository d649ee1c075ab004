use crate::{ChampSet, MutableChampSet};

#[test]
fn empty_set() {
    let set: ChampSet<u32> = ChampSet::new();
    assert!(set.is_empty());
    assert!(!set.contains(&1));
    assert_eq!(set.iter().next(), None);
}

#[test]
fn add_and_contains() {
    let set = ChampSet::new().copy_add("a").copy_add("b");
    assert_eq!(set.len(), 2);
    assert!(set.contains(&"a"));
    assert!(!set.contains(&"c"));
}

#[test]
fn get_returns_stored_element() {
    let set = ChampSet::new().copy_add(String::from("stored"));
    assert_eq!(set.get("stored").map(String::as_str), Some("stored"));
    assert_eq!(set.get("other"), None);
}

#[test]
fn remove_element() {
    let set: ChampSet<u32> = (0..10).collect();
    let fewer = set.copy_remove(&3);
    assert_eq!(fewer.len(), 9);
    assert!(!fewer.contains(&3));
    assert!(set.contains(&3));
}

#[test]
fn add_each_and_remove_each() {
    let set = ChampSet::new().copy_add_each(0..100_u32);
    assert_eq!(set.len(), 100);
    let doomed: Vec<u32> = (0..100).filter(|i| i % 10 != 0).collect();
    let tens = set.copy_remove_each(&doomed);
    assert_eq!(tens.len(), 10);
    let mut left: Vec<u32> = tens.iter().copied().collect();
    left.sort_unstable();
    assert_eq!(left, [0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
}

#[test]
fn set_algebra() {
    let a: ChampSet<u32> = (0..10).collect();
    let b: ChampSet<u32> = (5..15).collect();

    assert_eq!(a.copy_add_all(&b), (0..15).collect());
    assert_eq!(a.copy_retain_all(&b), (5..10).collect());
    assert_eq!(a.copy_remove_all(&b), (0..5).collect());
    assert_eq!(b.copy_remove_all(&a), (10..15).collect());
}

#[test]
fn retain_if_and_clear() {
    let set: ChampSet<u32> = (0..100).collect();
    let even = set.copy_retain_if(|k| k % 2 == 0);
    assert_eq!(even.len(), 50);
    assert!(set.copy_clear().is_empty());
    let empty: ChampSet<u32> = ChampSet::new();
    assert!(empty.copy_clear().ptr_eq(&empty));
}

#[test]
fn mutable_round_trip() {
    let set: ChampSet<u32> = (0..50).collect();
    let mut view = set.to_mutable();
    assert!(view.contains(&49));
    view.add(50);
    view.remove(&0);
    view.retain(|k| *k > 10);
    let frozen = view.into_immutable();
    assert_eq!(frozen, (11..=50).collect());
    assert_eq!(set.len(), 50);
}

#[test]
fn mutable_set_collects() {
    let view: MutableChampSet<u32> = [3, 1, 3, 2].into_iter().collect();
    assert_eq!(view.len(), 3);
    let set: ChampSet<u32> = view.into();
    assert!(set.contains(&2));
}
