//! Fan-in unions over many collections.
//!
//! Batches built independently (one builder per worker, say) are combined pairwise in a
//! balanced tree, so every key takes part in O(log n) unions instead of n.

use crate::map::Map;
use crate::set::Set;
use crate::trie_key::TrieKey;

/// Below this many inputs the halves are combined on the current thread.
#[cfg(feature = "rayon")]
const SEQUENTIAL_CUTOFF: usize = 2;

fn fold_halves<T: Clone>(items: &[T], empty: &T, join: &impl Fn(&T, &T) -> T) -> T {
    match items {
        [] => empty.clone(),
        [only] => only.clone(),
        _ => {
            let (left, right) = items.split_at(items.len() / 2);
            join(&fold_halves(left, empty, join), &fold_halves(right, empty, join))
        }
    }
}

#[cfg(feature = "rayon")]
fn par_fold_halves<T, F>(items: &[T], empty: &T, join: &F) -> T
where
    T: Clone + Send + Sync,
    F: Fn(&T, &T) -> T + Sync,
{
    if items.len() <= SEQUENTIAL_CUTOFF {
        return fold_halves(items, empty, join);
    }
    let (left, right) = items.split_at(items.len() / 2);
    let (left, right) = rayon::join(
        || par_fold_halves(left, empty, join),
        || par_fold_halves(right, empty, join),
    );
    join(&left, &right)
}

impl<K: TrieKey + Clone> Set<K> {
    /// Returns the union of all `sets`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let parts: Vec<Set<u32>> = (0..4).map(|w| (0..100).filter(|i| i % 4 == w).collect()).collect();
    /// assert_eq!(Set::union_all(&parts), (0..100).collect::<Set<u32>>());
    /// assert!(Set::<u32>::union_all(&[]).is_empty());
    /// ```
    pub fn union_all(sets: &[Set<K>]) -> Set<K> {
        log::debug!("union of {} sets", sets.len());
        fold_halves(sets, &Set::new(), &|a: &Set<K>, b: &Set<K>| a.union(b))
    }

    /// Like [`union_all`](Set::union_all), with the two halves of each split unioned on
    /// rayon's thread pool.
    #[cfg(feature = "rayon")]
    pub fn par_union_all(sets: &[Set<K>]) -> Set<K>
    where
        K: Send + Sync,
    {
        log::debug!("parallel union of {} sets", sets.len());
        par_fold_halves(sets, &Set::new(), &|a: &Set<K>, b: &Set<K>| a.union(b))
    }
}

impl<K: TrieKey + Clone, V: Clone> Map<K, V> {
    /// Returns the union of all `maps`. Where several maps have the same key, the one
    /// earliest in `maps` wins.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Map;
    /// let maps = [Map::from([(1, "a")]), Map::from([(1, "b"), (2, "b")])];
    /// let merged = Map::union_all(&maps);
    /// assert_eq!(merged.get(&1), Some(&"a"));
    /// assert_eq!(merged.get(&2), Some(&"b"));
    /// ```
    pub fn union_all(maps: &[Map<K, V>]) -> Map<K, V> {
        log::debug!("union of {} maps", maps.len());
        fold_halves(maps, &Map::new(), &|a: &Map<K, V>, b: &Map<K, V>| a.union(b))
    }

    /// Like [`union_all`](Map::union_all), with the two halves of each split unioned on
    /// rayon's thread pool. Conflicts resolve the same way.
    #[cfg(feature = "rayon")]
    pub fn par_union_all(maps: &[Map<K, V>]) -> Map<K, V>
    where
        K: Send + Sync,
        V: Send + Sync,
    {
        log::debug!("parallel union of {} maps", maps.len());
        par_fold_halves(maps, &Map::new(), &|a: &Map<K, V>, b: &Map<K, V>| a.union(b))
    }
}
