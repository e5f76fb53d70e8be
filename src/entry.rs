use std::fmt;

use crate::trie_key::TrieKey;

/// What a trie stores at its leaves.
///
/// Sets and maps share the whole trie engine and differ only in their entry type: a set
/// entry is a bare key, a map entry carries a value alongside it.
pub(crate) trait Entry: Clone {
    type Key: TrieKey;

    /// `false` when an entry is nothing but its key, so re-inserting an equal key can
    /// never change the trie.
    const HAS_PAYLOAD: bool;

    fn key(&self) -> &Self::Key;

    /// Materializes the member of a mask-leaf at bit `index`.
    fn from_mask_index(index: u32) -> Option<Self>;
}

#[derive(Clone)]
pub(crate) struct SetEntry<K>(pub(crate) K);

impl<K: TrieKey + Clone> Entry for SetEntry<K> {
    type Key = K;
    const HAS_PAYLOAD: bool = false;

    #[inline]
    fn key(&self) -> &K {
        &self.0
    }

    fn from_mask_index(index: u32) -> Option<Self> {
        K::from_trie_hash(index as u64).map(SetEntry)
    }
}

#[derive(Clone)]
pub(crate) struct MapEntry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K: TrieKey + Clone, V: Clone> Entry for MapEntry<K, V> {
    type Key = K;
    const HAS_PAYLOAD: bool = true;

    #[inline]
    fn key(&self) -> &K {
        &self.key
    }

    // Maps are never built from a mask.
    fn from_mask_index(_index: u32) -> Option<Self> {
        None
    }
}

impl<K: fmt::Debug> fmt::Debug for SetEntry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MapEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.key, self.value)
    }
}
