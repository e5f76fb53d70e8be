use std::borrow::Cow;
use std::iter::FusedIterator;
use std::slice;

use crate::entry::{Entry, MapEntry, SetEntry};
use crate::node::Node;

/// Depth-first walk over every entry below a node.
///
/// Entries come back borrowed, except the members of a mask-leaf, which have no storage
/// of their own and are rebuilt from their bit index.
pub(crate) struct EntryIter<'a, E> {
    stack: Vec<&'a Node<E>>,
    bucket: slice::Iter<'a, E>,
    mask: u64,
    remaining: usize,
}

impl<'a, E> EntryIter<'a, E> {
    pub(crate) fn new(root: Option<&'a Node<E>>) -> Self {
        EntryIter {
            remaining: root.map_or(0, Node::count),
            stack: root.into_iter().collect(),
            bucket: Default::default(),
            mask: 0,
        }
    }
}

impl<'a, E: Entry> Iterator for EntryIter<'a, E> {
    type Item = Cow<'a, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.bucket.next() {
                self.remaining -= 1;
                return Some(Cow::Borrowed(entry));
            }
            if self.mask != 0 {
                let bit = self.mask.trailing_zeros();
                self.mask &= self.mask - 1;
                self.remaining -= 1;
                match E::from_mask_index(bit) {
                    Some(entry) => return Some(Cow::Owned(entry)),
                    None => unreachable!("mask-leaf bit {bit} has no key"),
                }
            }
            match self.stack.pop()? {
                Node::Branch(branch) => {
                    self.stack
                        .extend(branch.children.iter().rev().map(|child| child.as_ref()));
                }
                Node::Bucket(bucket) => self.bucket = bucket.entries.iter(),
                Node::Mask(bits) => self.mask = *bits,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// An iterator over the members of a `Set`.
///
/// This struct is created by the [`iter`] method on [`Set`]. Members are yielded by value:
/// a set built from a mask stores no keys to borrow.
///
/// [`iter`]: crate::Set::iter
/// [`Set`]: crate::Set
pub struct Iter<'a, K> {
    pub(crate) inner: EntryIter<'a, SetEntry<K>>,
}

impl<K: crate::TrieKey + Clone> Iterator for Iter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| entry.into_owned().0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: crate::TrieKey + Clone> ExactSizeIterator for Iter<'_, K> {}
impl<K: crate::TrieKey + Clone> FusedIterator for Iter<'_, K> {}

/// An iterator over the key-value pairs of a `Map`.
///
/// This struct is created by the [`iter`] method on [`Map`].
///
/// [`iter`]: crate::Map::iter
/// [`Map`]: crate::Map
pub struct MapIter<'a, K, V> {
    pub(crate) inner: EntryIter<'a, MapEntry<K, V>>,
}

impl<'a, K: crate::TrieKey + Clone, V: Clone> Iterator for MapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Cow::Borrowed(entry) => Some((&entry.key, &entry.value)),
            Cow::Owned(_) => unreachable!("map trie holds a mask-leaf"),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: crate::TrieKey + Clone, V: Clone> ExactSizeIterator for MapIter<'_, K, V> {}
impl<K: crate::TrieKey + Clone, V: Clone> FusedIterator for MapIter<'_, K, V> {}

/// An iterator over the keys of a `Map`.
///
/// This struct is created by the [`keys`] method on [`Map`].
///
/// [`keys`]: crate::Map::keys
/// [`Map`]: crate::Map
pub struct Keys<'a, K, V> {
    pub(crate) inner: MapIter<'a, K, V>,
}

impl<'a, K: crate::TrieKey + Clone, V: Clone> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the values of a `Map`.
///
/// This struct is created by the [`values`] method on [`Map`].
///
/// [`values`]: crate::Map::values
/// [`Map`]: crate::Map
pub struct Values<'a, K, V> {
    pub(crate) inner: MapIter<'a, K, V>,
}

impl<'a, K: crate::TrieKey + Clone, V: Clone> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
