use std::hash::{DefaultHasher, Hash, Hasher};

/// The `TrieKey` trait allows a type to be used as a key in a `Set` or `Map`.
///
/// A key provides a 64-bit hash that decides its path through the trie, six bits per
/// level. Equality comes from `Eq`: two keys that hash alike but compare unequal are kept
/// side by side in a collision bucket.
///
/// Small integer keys hash to themselves, which is what lets a `Set` of values below 64 be
/// stored as a single bitmap.
pub trait TrieKey: Eq {
    /// Returns the 64-bit hash of the key.
    fn trie_hash(&self) -> u64;

    /// Rebuilds a key from its hash, for key types whose hash is the identity.
    ///
    /// Returns `None` for hashed key types.
    fn from_trie_hash(hash: u64) -> Option<Self>
    where
        Self: Sized,
    {
        let _ = hash;
        None
    }
}

/// Hashes a value with SipHash under fixed keys, so trie shapes are reproducible.
pub(crate) fn sip_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

macro_rules! identity_hashed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TrieKey for $ty {
                #[inline]
                fn trie_hash(&self) -> u64 {
                    *self as u64
                }

                #[inline]
                fn from_trie_hash(hash: u64) -> Option<Self> {
                    <$ty>::try_from(hash).ok()
                }
            }
        )*
    };
}

identity_hashed!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl TrieKey for bool {
    fn trie_hash(&self) -> u64 {
        *self as u64
    }

    fn from_trie_hash(hash: u64) -> Option<Self> {
        match hash {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

impl TrieKey for char {
    fn trie_hash(&self) -> u64 {
        *self as u64
    }

    fn from_trie_hash(hash: u64) -> Option<Self> {
        u32::try_from(hash).ok().and_then(char::from_u32)
    }
}

impl TrieKey for str {
    fn trie_hash(&self) -> u64 {
        sip_hash(self)
    }
}

impl TrieKey for String {
    fn trie_hash(&self) -> u64 {
        sip_hash(self.as_str())
    }
}

impl<T: Hash + Eq> TrieKey for Vec<T> {
    fn trie_hash(&self) -> u64 {
        sip_hash(self.as_slice())
    }
}

impl<T: Hash + Eq> TrieKey for [T] {
    fn trie_hash(&self) -> u64 {
        sip_hash(self)
    }
}

impl<T: TrieKey + ?Sized> TrieKey for &T {
    fn trie_hash(&self) -> u64 {
        T::trie_hash(*self)
    }
}

impl<T: TrieKey + ?Sized> TrieKey for Box<T> {
    fn trie_hash(&self) -> u64 {
        T::trie_hash(self)
    }
}
