use std::fmt;
use std::sync::Arc;

use crate::entry::MapEntry;
use crate::iter::{EntryIter, Keys, MapIter, Values};
use crate::node::Node;
use crate::trie::{self, Rendered};
use crate::trie_key::TrieKey;

/// An immutable, persistent map backed by a hash trie.
///
/// Shares its trie engine with [`Set`](crate::Set); entries carry a value next to the key.
/// Deriving a map copies only the path to the change.
///
/// # Examples
///
/// ```
/// use frozen_trie::Map;
///
/// let prices = Map::new().with("apple", 3).with("pear", 5);
/// let updated = prices.with("apple", 4);
///
/// assert_eq!(prices.get(&"apple"), Some(&3));
/// assert_eq!(updated.get(&"apple"), Some(&4));
/// assert_eq!(updated.get(&"plum"), None);
/// assert_eq!(updated.count(), 2);
/// ```
pub struct Map<K, V> {
    pub(crate) root: Option<Arc<Node<MapEntry<K, V>>>>,
    pub(crate) size: usize,
}

impl<K, V> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Map {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<K, V> Default for Map<K, V> {
    /// Creates an empty `Map`.
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Map<K, V> {
    /// Creates an empty `Map`. Does not allocate.
    pub const fn new() -> Self {
        Map {
            root: None,
            size: 0,
        }
    }

    pub(crate) fn from_root(root: Option<Arc<Node<MapEntry<K, V>>>>) -> Self {
        let size = root.as_ref().map_or(0, |node| node.count());
        Map { root, size }
    }

    /// Returns the number of entries. O(1).
    pub fn count(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if both maps are the same trie, not merely equal ones.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<K: TrieKey + Clone, V: Clone> Map<K, V> {
    /// Returns the value for `key`, or `None` if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Map;
    /// let map = Map::new().with(1, "one");
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let root = self.root.as_ref()?;
        trie::lookup(root, key, key.trie_hash(), 0).map(|entry| &entry.value)
    }

    /// Returns `true` if the map has an entry for `key`.
    pub fn has(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a map where `key` is associated with `value`, replacing any previous value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Map;
    /// let a = Map::new().with("k", 1);
    /// let b = a.with("k", 2);
    /// assert_eq!(a.get(&"k"), Some(&1));
    /// assert_eq!(b.get(&"k"), Some(&2));
    /// assert_eq!(b.count(), 1);
    /// ```
    pub fn with(&self, key: K, value: V) -> Self {
        let mut root = self.root.clone();
        let added = trie::insert_root(&mut root, MapEntry { key, value });
        Map {
            root,
            size: self.size + added as usize,
        }
    }

    /// Returns a map without an entry for `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Map;
    /// let map = Map::new().with(1, 'a').with(2, 'b');
    /// let smaller = map.without(&1);
    /// assert_eq!(smaller.get(&1), None);
    /// assert_eq!(map.get(&1), Some(&'a'));
    /// ```
    pub fn without(&self, key: &K) -> Self {
        let mut root = self.root.clone();
        match trie::remove_root(&mut root, key) {
            Some(_) => Map {
                root,
                size: self.size - 1,
            },
            None => self.clone(),
        }
    }

    /// Returns the union of two maps.
    ///
    /// Where both maps have an entry for the same key, the entry from `self` wins.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Map;
    /// let left = Map::new().with("shared", 1).with("left", 1);
    /// let right = Map::new().with("shared", 2).with("right", 2);
    ///
    /// let merged = left.union(&right);
    /// assert_eq!(merged.count(), 3);
    /// assert_eq!(merged.get(&"shared"), Some(&1));
    /// assert_eq!(right.union(&left).get(&"shared"), Some(&2));
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        match (&self.root, &other.root) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => Map::from_root(Some(trie::union(a, b, 0))),
        }
    }

    /// Returns an iterator over the entries, in no particular order.
    pub fn iter(&self) -> MapIter<'_, K, V> {
        MapIter {
            inner: EntryIter::new(self.root.as_deref()),
        }
    }

    /// Returns an iterator over the keys, in no particular order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values, in no particular order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Renders the trie, one node per line, for comparing snapshots when a test fails.
    /// The format is not stable.
    pub fn debug_tree(&self) -> String
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        match &self.root {
            Some(root) => Rendered(root.as_ref()).to_string(),
            None => String::from("empty\n"),
        }
    }
}

impl<K: TrieKey + Clone, V: Clone + PartialEq> PartialEq for Map<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => trie::equal(a, b, &|x: &MapEntry<K, V>, y: &MapEntry<K, V>| {
                x.value == y.value
            }),
            _ => false,
        }
    }
}

impl<K: TrieKey + Clone, V: Clone + Eq> Eq for Map<K, V> {}

impl<K, V> fmt::Debug for Map<K, V>
where
    K: TrieKey + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: TrieKey + Clone, V: Clone> FromIterator<(K, V)> for Map<K, V> {
    /// Builds the trie level by level. Later pairs win over earlier ones with the same key.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, value)| (key.trie_hash(), MapEntry { key, value }))
            .collect();
        Map::from_root(trie::build(entries, 0))
    }
}

impl<K: TrieKey + Clone, V: Clone, const N: usize> From<[(K, V); N]> for Map<K, V> {
    fn from(array: [(K, V); N]) -> Self {
        array.into_iter().collect()
    }
}

impl<'a, K: TrieKey + Clone, V: Clone> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = MapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
