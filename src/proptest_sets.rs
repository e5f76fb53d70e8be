use super::*;
use proptest::prelude::*;
use std::collections::HashMap;
use std::collections::HashSet;

/// A key with few distinct hashes, so that buckets fill up.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Clumped(u16);

impl TrieKey for Clumped {
    fn trie_hash(&self) -> u64 {
        // Spread the eight hashes over different top-level slots and depths.
        [0, 1, 64, 65, 4096, 1 << 40, 1 << 63, u64::MAX][(self.0 % 8) as usize]
    }
}

fn keys(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(
        prop_oneof![0..64u64, 0..5000u64, any::<u64>()],
        0..max_len,
    )
}

fn clumped_keys(max_len: usize) -> impl Strategy<Value = Vec<Clumped>> {
    proptest::collection::vec(any::<u16>().prop_map(Clumped), 0..max_len)
}

#[derive(Debug, Clone)]
enum Operation {
    With(u64),
    Without(u64),
    Union(Vec<u64>),
}

fn operations() -> impl Strategy<Value = Vec<Operation>> {
    proptest::collection::vec(
        prop_oneof![
            4 => (0..300u64).prop_map(Operation::With),
            2 => (0..300u64).prop_map(Operation::Without),
            1 => proptest::collection::vec(0..300u64, 0..20).prop_map(Operation::Union),
        ],
        0..200,
    )
}

fn snapshot<K: TrieKey + Clone + std::hash::Hash>(set: &Set<K>) -> HashSet<K> {
    set.iter().collect()
}

#[test]
fn test_sequential_inserts_reach_two_to_the_twenty() {
    let total = 1u64 << 20;
    let mut set = Set::new();
    for i in 0..total {
        set = set.with(i);
    }
    assert_eq!(set.count(), total as usize);
    assert!((0..total).step_by(997).all(|i| set.has(&i)));
    assert!(!set.has(&total));
}

proptest! {
    #[test]
    fn test_with_leaves_original_untouched(base in keys(200), extra in keys(50)) {
        let set: Set<u64> = base.iter().copied().collect();
        let before = snapshot(&set);

        let mut derived = set.clone();
        for &k in &extra {
            derived = derived.with(k);
        }
        let merged = set.union(&derived);

        prop_assert_eq!(set.count(), before.len());
        prop_assert_eq!(snapshot(&set), before.clone());
        for k in &extra {
            prop_assert_eq!(set.has(k), before.contains(k));
            prop_assert!(merged.has(k));
        }
    }

    #[test]
    fn test_union_laws(a in keys(150), b in keys(150), d in keys(150)) {
        let a: Set<u64> = a.into_iter().collect();
        let b: Set<u64> = b.into_iter().collect();
        let d: Set<u64> = d.into_iter().collect();

        prop_assert_eq!(a.union(&Set::new()), a.clone());
        prop_assert_eq!(a.union(&a), a.clone());
        prop_assert_eq!(a.union(&b), b.union(&a));
        prop_assert_eq!(a.union(&b).union(&d), a.union(&b.union(&d)));

        let expected: HashSet<u64> = snapshot(&a).union(&snapshot(&b)).copied().collect();
        let union = a.union(&b);
        prop_assert_eq!(union.count(), expected.len());
        prop_assert_eq!(snapshot(&union), expected);
    }

    #[test]
    fn test_union_laws_with_collisions(a in clumped_keys(100), b in clumped_keys(100)) {
        let a: Set<Clumped> = a.into_iter().collect();
        let b: Set<Clumped> = b.into_iter().collect();
        let union = a.union(&b);

        prop_assert_eq!(union.clone(), b.union(&a));
        let expected: HashSet<Clumped> = snapshot(&a).union(&snapshot(&b)).cloned().collect();
        prop_assert_eq!(snapshot(&union), expected);
        prop_assert_eq!(union.root.as_ref().map_or(0, |root| root.validate(0, 0)), union.count());
    }

    #[test]
    fn test_with_then_has(base in keys(200), k in any::<u64>()) {
        let set: Set<u64> = base.iter().copied().collect();
        let grown = set.with(k);
        prop_assert!(grown.has(&k));
        for x in &base {
            prop_assert!(grown.has(x));
        }
    }

    #[test]
    fn test_count_matches_model(ops in operations()) {
        let mut set = Set::new();
        let mut model = HashSet::new();
        for op in ops {
            match op {
                Operation::With(k) => {
                    set = set.with(k);
                    model.insert(k);
                }
                Operation::Without(k) => {
                    set = set.without(&k);
                    model.remove(&k);
                }
                Operation::Union(keys) => {
                    set = set.union(&keys.iter().copied().collect());
                    model.extend(keys);
                }
            }
            prop_assert_eq!(set.count(), model.len());
        }
        prop_assert_eq!(snapshot(&set), model.clone());
        prop_assert!((0..300).all(|k| set.has(&k) == model.contains(&k)));
        prop_assert_eq!(set.root.as_ref().map_or(0, |root| root.validate(0, 0)), model.len());
    }

    #[test]
    fn test_mask_membership(mask in any::<u64>()) {
        let set: Set<u64> = Set::from_mask64(mask);
        prop_assert_eq!(set.count(), mask.count_ones() as usize);
        for i in 0..64 {
            prop_assert_eq!(set.has(&i), (mask >> i) & 1 == 1);
        }
        let inserted = (0..64).filter(|i| (mask >> i) & 1 == 1).fold(Set::new(), |s, i| s.with(i));
        prop_assert_eq!(set, inserted);
    }

    #[test]
    fn test_ranges_match_step_by(start in -200i64..200, len in 0i64..400, step in 1i64..20, down in any::<bool>()) {
        let (end, step) = if down { (start - len, -step) } else { (start + len, step) };
        let set = Set::from_range(start, end, step);

        let mut expected = HashSet::new();
        let mut value = start;
        while (step > 0 && value < end) || (step < 0 && value > end) {
            expected.insert(value);
            value += step;
        }
        prop_assert_eq!(snapshot(&set), expected);
    }

    #[test]
    fn test_builder_matches_sequential(values in keys(300), clumped in clumped_keys(100)) {
        let mut builder = SetBuilder::new();
        builder.extend(values.iter().copied());
        let sequential = values.iter().fold(Set::new(), |set, &k| set.with(k));
        let built = builder.finish();
        prop_assert_eq!(&built, &sequential);
        prop_assert_eq!(built.debug_tree(), sequential.debug_tree());

        let mut builder = SetBuilder::new();
        builder.extend(clumped.iter().cloned());
        let sequential = clumped.iter().fold(Set::new(), |set, k| set.with(k.clone()));
        prop_assert_eq!(builder.finish(), sequential);
    }

    #[test]
    fn test_map_matches_model(pairs in proptest::collection::vec((0..500u32, any::<i32>()), 0..300)) {
        let mut map = Map::new();
        let mut builder = MapBuilder::new();
        let mut model = HashMap::new();
        for &(k, v) in &pairs {
            map = map.with(k, v);
            builder.add(k, v);
            model.insert(k, v);
        }
        let collected: Map<u32, i32> = pairs.iter().copied().collect();

        prop_assert_eq!(map.count(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(map.get(k), Some(v));
        }
        prop_assert_eq!(&builder.finish(), &map);
        prop_assert_eq!(&collected, &map);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip(values in keys(300)) {
        let set: Set<u64> = values.into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        let back: Set<u64> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, set);
    }
}
