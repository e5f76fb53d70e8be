//! Persistent hash-trie sets and maps.
//!
//! This crate provides [`Set`] and [`Map`], immutable collections built on a hash array
//! mapped trie. Deriving a new collection from an old one (`with`, `without`, `union`)
//! copies only the path to the change and shares every other node, so old versions stay
//! valid and cheap to keep around.
//!
//! # Features
//!
//! - O(1) `count` and cheap `clone`, lookups in at most eleven node visits
//! - Unions whose cost follows how much two tries differ, not how big they are
//! - [`SetBuilder`] and [`MapBuilder`] for batch construction with in-place updates
//! - A one-allocation representation for sets of integers below 64
//! - Divide-and-conquer unions over many collections, optionally on rayon
//! - serde support behind the `serde` feature

mod builder;
mod entry;
mod error;
mod iter;
mod map;
mod node;
mod parallel;
mod range;
#[cfg(feature = "serde")]
mod serde_impls;
mod set;
mod trie;
mod trie_key;

pub use builder::{MapBuilder, SetBuilder};
pub use error::Error;
pub use iter::{Iter, Keys, MapIter, Values};
pub use map::Map;
pub use set::Set;
pub use trie_key::TrieKey;

/// Result type for the fallible constructors.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod proptest_sets;
