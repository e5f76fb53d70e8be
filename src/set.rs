use std::fmt;
use std::sync::Arc;

use crate::entry::SetEntry;
use crate::iter::{EntryIter, Iter};
use crate::node::Node;
use crate::trie::{self, Rendered};
use crate::trie_key::TrieKey;

/// An immutable, persistent set backed by a hash trie.
///
/// Every operation that "changes" a set returns a new one; the original is left exactly as
/// it was. The two share all nodes the change did not touch, so keeping old versions
/// around costs memory only for the differences.
///
/// # Examples
///
/// ```
/// use frozen_trie::Set;
///
/// let empty = Set::new();
/// let one = empty.with(1);
/// let two = one.with(2);
///
/// assert_eq!(empty.count(), 0);
/// assert_eq!(one.count(), 1);
/// assert!(two.has(&1) && two.has(&2));
///
/// // Redundant inserts hand back the same set.
/// assert!(two.with(2).ptr_eq(&two));
///
/// let evens: Set<u64> = (0..10).map(|i| i * 2).collect();
/// let odds: Set<u64> = (0..10).map(|i| i * 2 + 1).collect();
/// assert_eq!(evens.union(&odds), (0..20).collect::<Set<u64>>());
/// ```
pub struct Set<K> {
    pub(crate) root: Option<Arc<Node<SetEntry<K>>>>,
    pub(crate) size: usize,
}

impl<K> Clone for Set<K> {
    fn clone(&self) -> Self {
        Set {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<K> Default for Set<K> {
    /// Creates an empty `Set`.
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Set<K> {
    /// Creates an empty `Set`. Does not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let set: Set<i64> = Set::new();
    /// assert!(set.is_empty());
    /// ```
    pub const fn new() -> Self {
        Set {
            root: None,
            size: 0,
        }
    }

    pub(crate) fn from_root(root: Option<Arc<Node<SetEntry<K>>>>) -> Self {
        let size = root.as_ref().map_or(0, |node| node.count());
        Set { root, size }
    }

    /// Returns the number of members. O(1).
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let set = Set::new().with("a").with("b").with("a");
    /// assert_eq!(set.count(), 2);
    /// ```
    pub fn count(&self) -> usize {
        self.size
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if both sets are the same trie, not merely equal ones.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let a = Set::new().with(1).with(2);
    /// let b = Set::new().with(2).with(1);
    /// assert!(a.ptr_eq(&a.clone()));
    /// assert!(!a.ptr_eq(&b));
    /// assert_eq!(a, b);
    /// ```
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<K: TrieKey + Clone> Set<K> {
    /// Returns `true` if `key` is a member.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let set = Set::new().with(7);
    /// assert!(set.has(&7));
    /// assert!(!set.has(&8));
    /// ```
    pub fn has(&self, key: &K) -> bool {
        match &self.root {
            Some(root) => trie::contains(root, key, key.trie_hash(), 0),
            None => false,
        }
    }

    /// Returns a set that also contains `key`.
    ///
    /// If `key` is already a member the result shares this set's root and nothing is
    /// allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let before = Set::new().with(1);
    /// let after = before.with(2);
    /// assert!(!before.has(&2));
    /// assert!(after.has(&1) && after.has(&2));
    /// ```
    pub fn with(&self, key: K) -> Self {
        let mut root = self.root.clone();
        if trie::insert_root(&mut root, SetEntry(key)) {
            Set {
                root,
                size: self.size + 1,
            }
        } else {
            self.clone()
        }
    }

    /// Returns a set without `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let set = Set::new().with(1).with(2);
    /// let smaller = set.without(&1);
    /// assert_eq!(smaller.count(), 1);
    /// assert!(set.has(&1));
    /// assert!(smaller.without(&1).ptr_eq(&smaller));
    /// ```
    pub fn without(&self, key: &K) -> Self {
        let mut root = self.root.clone();
        match trie::remove_root(&mut root, key) {
            Some(_) => Set {
                root,
                size: self.size - 1,
            },
            None => self.clone(),
        }
    }

    /// Returns the union of two sets.
    ///
    /// Union with an empty set, or with a set sharing the same root, returns the other
    /// operand without allocating. Otherwise only the parts where the tries differ are
    /// visited.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let a = Set::new().with(1).with(2);
    /// let b = Set::new().with(2).with(3);
    /// let both = a.union(&b);
    /// assert_eq!(both.count(), 3);
    /// assert!(a.union(&Set::new()).ptr_eq(&a));
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        match (&self.root, &other.root) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => Set::from_root(Some(trie::union(a, b, 0))),
        }
    }

    /// Returns an iterator over the members, in no particular order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let set = Set::new().with(3).with(1).with(2);
    /// let mut members: Vec<_> = set.iter().collect();
    /// members.sort();
    /// assert_eq!(members, vec![1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: EntryIter::new(self.root.as_deref()),
        }
    }

    /// Renders the trie, one node per line, for comparing snapshots when a test fails.
    /// The format is not stable.
    pub fn debug_tree(&self) -> String
    where
        K: fmt::Debug,
    {
        match &self.root {
            Some(root) => Rendered(root.as_ref()).to_string(),
            None => String::from("empty\n"),
        }
    }
}

impl<K: TrieKey + Clone> PartialEq for Set<K> {
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => trie::equal(a, b, &|_, _| true),
            _ => false,
        }
    }
}

impl<K: TrieKey + Clone> Eq for Set<K> {}

impl<K: TrieKey + Clone + fmt::Debug> fmt::Debug for Set<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: TrieKey + Clone> FromIterator<K> for Set<K> {
    /// Builds the trie level by level rather than by repeated insertion.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|key| (key.trie_hash(), SetEntry(key)))
            .collect();
        Set::from_root(trie::build(entries, 0))
    }
}

impl<K: TrieKey + Clone, const N: usize> From<[K; N]> for Set<K> {
    fn from(array: [K; N]) -> Self {
        array.into_iter().collect()
    }
}

impl<'a, K: TrieKey + Clone> IntoIterator for &'a Set<K> {
    type Item = K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
