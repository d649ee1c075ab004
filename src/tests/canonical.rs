use super::{MaskedState, check_invariants, shape};
use crate::{ChampMap, ChampSet, MutableChampMap};

fn build<I: IntoIterator<Item = (u64, u64)>>(pairs: I) -> ChampMap<u64, u64> {
    let mut map = ChampMap::new();
    for (k, v) in pairs {
        map = map.copy_put(k, v);
    }
    map
}

/// Insertion order must not affect the resulting structure.
#[test]
fn insert_order_abc_cba_bca() {
    let orders: [&[(u64, u64)]; 3] = [
        &[(1, 10), (2, 20), (3, 30)],
        &[(3, 30), (2, 20), (1, 10)],
        &[(2, 20), (3, 30), (1, 10)],
    ];

    let maps: Vec<ChampMap<u64, u64>> = orders.iter().map(|pairs| build(pairs.iter().copied())).collect();

    assert_eq!(shape(&maps[0].raw.root), shape(&maps[1].raw.root));
    assert_eq!(shape(&maps[1].raw.root), shape(&maps[2].raw.root));
    assert_eq!(maps[0], maps[1]);
}

/// Larger set: 1000 entries, three orderings.
#[test]
fn insert_order_1000_entries() {
    let entries: Vec<(u64, u64)> = (0..1000).map(|i| (i, i * 7)).collect();

    let forward = build(entries.iter().copied());
    let backward = build(entries.iter().rev().copied());
    let interleaved = build(
        entries
            .iter()
            .step_by(2)
            .chain(entries.iter().skip(1).step_by(2))
            .copied(),
    );

    assert_eq!(shape(&forward.raw.root), shape(&backward.raw.root));
    assert_eq!(shape(&forward.raw.root), shape(&interleaved.raw.root));
    assert_eq!(check_invariants(&forward.raw.root), 1000);
}

/// After overwrite, order independence still holds.
#[test]
fn overwrite_preserves_canonicity() {
    let map_a = build([(1, 10), (2, 20), (1, 11)]);
    let map_b = build([(2, 20), (1, 11)]);

    assert_eq!(shape(&map_a.raw.root), shape(&map_b.raw.root));
    assert_eq!(map_a, map_b);
}

/// After delete, order independence holds.
#[test]
fn delete_preserves_canonicity() {
    let map_a = build([(1, 10), (2, 20), (3, 30)]).copy_remove(&2);
    let map_b = build([(3, 30), (1, 10)]);

    assert_eq!(shape(&map_a.raw.root), shape(&map_b.raw.root));
    assert_eq!(map_a, map_b);
}

/// Growing then shrinking back lands on the structure of the survivors alone.
#[test]
fn shrink_matches_direct_build() {
    let full = build((0..5_000).map(|i| (i, i)));
    let mut shrunk = full.to_mutable();
    for i in 100..5_000 {
        shrunk.remove(&i);
    }
    let shrunk = shrunk.into_immutable();
    let direct = build((0..100).map(|i| (i, i)));

    assert_eq!(shape(&shrunk.raw.root), shape(&direct.raw.root));
    check_invariants(&shrunk.raw.root);
}

/// Transient and persistent builds agree.
#[test]
fn transient_build_matches_persistent() {
    let persistent = build((0..3_000).map(|i| (i * 31, i)));
    let transient: MutableChampMap<u64, u64> = (0..3_000).rev().map(|i| (i * 31, i)).collect();
    let transient = transient.into_immutable();

    assert_eq!(shape(&persistent.raw.root), shape(&transient.raw.root));
    assert_eq!(persistent, transient);
}

/// Merges produce the canonical structure of their result.
#[test]
fn merge_results_are_canonical() {
    let a: ChampSet<u32, MaskedState<12>> = (0..3_000).collect();
    let b: ChampSet<u32, MaskedState<12>> = (1_500..4_500).collect();

    let union = a.copy_add_all(&b);
    let direct: ChampSet<u32, MaskedState<12>> = (0..4_500).collect();
    assert_eq!(shape(&union.raw.root), shape(&direct.raw.root));

    let both = a.copy_retain_all(&b);
    let direct: ChampSet<u32, MaskedState<12>> = (1_500..3_000).collect();
    assert_eq!(shape(&both.raw.root), shape(&direct.raw.root));
    check_invariants(&both.raw.root);

    let only_a = a.copy_remove_all(&b);
    let direct: ChampSet<u32, MaskedState<12>> = (0..1_500).collect();
    assert_eq!(shape(&only_a.raw.root), shape(&direct.raw.root));
    check_invariants(&only_a.raw.root);
}

#[cfg(feature = "stats")]
#[test]
fn stats_ignore_history() {
    let forward = build((0..2_000).map(|i| (i, i)));
    let backward = build((0..2_000).rev().map(|i| (i, i)));
    let churned = build((0..4_000).map(|i| (i, i))).copy_remove_each(&(2_000..4_000).collect::<Vec<_>>());

    assert_eq!(forward.stats(), backward.stats());
    assert_eq!(forward.stats(), churned.stats());
    assert_eq!(forward.stats().entries, 2_000);
}
