use std::sync::Arc;

use crate::entry::{MapEntry, SetEntry};
use crate::map::Map;
use crate::node::Node;
use crate::set::Set;
use crate::trie;
use crate::trie_key::TrieKey;

/// A mutable staging area for building a [`Set`].
///
/// While nodes are held only by the builder, `add` edits them in place instead of copying
/// the path to every insertion. [`finish`](SetBuilder::finish) hands out a `Set` that
/// shares those nodes; from then on the builder copies any node it would change, so the
/// returned set never sees later additions.
///
/// A builder has one writer. To build in parallel, give each worker its own builder and
/// combine the finished sets with [`Set::union_all`] or [`Set::par_union_all`].
///
/// # Examples
///
/// ```
/// use frozen_trie::SetBuilder;
///
/// let mut builder = SetBuilder::new();
/// for i in 0..1000 {
///     builder.add(i);
/// }
/// let first = builder.finish();
///
/// builder.add(1000);
/// let second = builder.finish();
///
/// assert_eq!(first.count(), 1000);
/// assert_eq!(second.count(), 1001);
/// assert!(!first.has(&1000));
/// ```
pub struct SetBuilder<K> {
    root: Option<Arc<Node<SetEntry<K>>>>,
    size: usize,
}

impl<K> Default for SetBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SetBuilder<K> {
    /// Creates an empty builder.
    pub const fn new() -> Self {
        SetBuilder {
            root: None,
            size: 0,
        }
    }

    /// Returns the number of keys added so far.
    pub fn count(&self) -> usize {
        self.size
    }

    /// Returns `true` if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl<K: TrieKey + Clone> SetBuilder<K> {
    /// Adds `key`. Adding a key that is already present changes nothing.
    pub fn add(&mut self, key: K) {
        if trie::insert_root(&mut self.root, SetEntry(key)) {
            self.size += 1;
        }
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let removed = trie::remove_root(&mut self.root, key).is_some();
        if removed {
            self.size -= 1;
        }
        removed
    }

    /// Returns `true` if `key` has been added.
    pub fn has(&self, key: &K) -> bool {
        match &self.root {
            Some(root) => trie::contains(root, key, key.trie_hash(), 0),
            None => false,
        }
    }

    /// Returns a `Set` with everything added so far.
    ///
    /// The builder stays usable. Its nodes are now shared with the returned set, so the
    /// next change to any of them copies it first.
    pub fn finish(&mut self) -> Set<K> {
        log::trace!("finishing set builder with {} keys", self.size);
        Set {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<K: TrieKey + Clone> Extend<K> for SetBuilder<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<K> From<Set<K>> for SetBuilder<K> {
    /// Continues building from an existing set, sharing its nodes.
    fn from(set: Set<K>) -> Self {
        SetBuilder {
            root: set.root,
            size: set.size,
        }
    }
}

/// A mutable staging area for building a [`Map`].
///
/// Works like [`SetBuilder`]: in-place updates while the builder is the only owner of its
/// nodes, copy-on-write once [`finish`](MapBuilder::finish) has shared them.
///
/// # Examples
///
/// ```
/// use frozen_trie::MapBuilder;
///
/// let mut builder = MapBuilder::new();
/// builder.add("apple", 1);
/// builder.add("banana", 2);
/// builder.add("apple", 3);
///
/// let map = builder.finish();
/// assert_eq!(map.count(), 2);
/// assert_eq!(map.get(&"apple"), Some(&3));
/// ```
pub struct MapBuilder<K, V> {
    root: Option<Arc<Node<MapEntry<K, V>>>>,
    size: usize,
}

impl<K, V> Default for MapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MapBuilder<K, V> {
    /// Creates an empty builder.
    pub const fn new() -> Self {
        MapBuilder {
            root: None,
            size: 0,
        }
    }

    /// Returns the number of keys added so far.
    pub fn count(&self) -> usize {
        self.size
    }

    /// Returns `true` if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl<K: TrieKey + Clone, V: Clone> MapBuilder<K, V> {
    /// Associates `value` with `key`, replacing any earlier value.
    pub fn add(&mut self, key: K, value: V) {
        if trie::insert_root(&mut self.root, MapEntry { key, value }) {
            self.size += 1;
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = trie::remove_root(&mut self.root, key)?;
        self.size -= 1;
        Some(entry.value)
    }

    /// Returns the value added for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let root = self.root.as_ref()?;
        trie::lookup(root, key, key.trie_hash(), 0).map(|entry| &entry.value)
    }

    /// Returns `true` if `key` has been added.
    pub fn has(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a `Map` with everything added so far. The builder stays usable.
    pub fn finish(&mut self) -> Map<K, V> {
        log::trace!("finishing map builder with {} keys", self.size);
        Map {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<K: TrieKey + Clone, V: Clone> Extend<(K, V)> for MapBuilder<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K, V> From<Map<K, V>> for MapBuilder<K, V> {
    /// Continues building from an existing map, sharing its nodes.
    fn from(map: Map<K, V>) -> Self {
        MapBuilder {
            root: map.root,
            size: map.size,
        }
    }
}
