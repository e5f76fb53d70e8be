use std::sync::Arc;

use crate::entry::Entry;

/// Hash bits consumed per trie level; a level fans out to 64 children, one per bit of a
/// `u64` occupancy map.
pub(crate) const BITS_PER_LEVEL: u32 = 6;

/// The deepest level. Level 10 reads the top four hash bits, after which the hash is spent.
pub(crate) const MAX_DEPTH: u32 = 64 / BITS_PER_LEVEL;

const LEVEL_MASK: u64 = (1 << BITS_PER_LEVEL) - 1;

/// A trie node.
///
/// Nodes reachable from a published container are never mutated. Mutation goes through
/// `Arc::make_mut`, which only hands out `&mut` while the caller holds the sole reference.
#[derive(Clone)]
pub(crate) enum Node<E> {
    Branch(Branch<E>),
    Bucket(Bucket<E>),
    /// Membership of the integers `0..64`, one bit each. Only ever a root.
    Mask(u64),
}

/// An interior node: a sparse array of children indexed by the set bits of `occ`.
#[derive(Clone)]
pub(crate) struct Branch<E> {
    pub(crate) occ: u64,
    pub(crate) count: usize,
    pub(crate) children: Vec<Arc<Node<E>>>,
}

/// Terminal entries sharing one full 64-bit hash. Never empty.
#[derive(Clone)]
pub(crate) struct Bucket<E> {
    pub(crate) hash: u64,
    pub(crate) entries: Vec<E>,
}

// Bit manipulation utilities
#[inline(always)]
pub(crate) fn slot(hash: u64, depth: u32) -> u32 {
    debug_assert!(depth <= MAX_DEPTH);
    ((hash >> (depth * BITS_PER_LEVEL)) & LEVEL_MASK) as u32
}

#[inline(always)]
pub(crate) fn set_bit(occ: &mut u64, bit: u32) {
    *occ |= 1u64 << bit;
}

#[inline(always)]
pub(crate) fn clear_bit(occ: &mut u64, bit: u32) {
    *occ &= !(1u64 << bit);
}

#[inline(always)]
pub(crate) fn test_bit(occ: u64, bit: u32) -> bool {
    (occ >> bit) & 0x01 != 0
}

/// Position of `bit`'s child in a dense child array.
#[inline(always)]
pub(crate) fn popcount(occ: u64, bit: u32) -> usize {
    (occ & ((1u64 << bit) - 1)).count_ones() as usize
}

impl<E> Node<E> {
    pub(crate) fn bucket(hash: u64, entry: E) -> Self {
        Node::Bucket(Bucket {
            hash,
            entries: vec![entry],
        })
    }

    /// Number of entries in this subtree.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        match self {
            Node::Branch(branch) => branch.count,
            Node::Bucket(bucket) => bucket.entries.len(),
            Node::Mask(bits) => bits.count_ones() as usize,
        }
    }

    /// Joins two buckets with different hashes under a fresh branch at `depth`,
    /// adding single-child branches while their hash slices still agree.
    pub(crate) fn pair(
        first: Arc<Node<E>>,
        first_hash: u64,
        second: Arc<Node<E>>,
        second_hash: u64,
        depth: u32,
    ) -> Self {
        debug_assert_ne!(first_hash, second_hash);
        let count = first.count() + second.count();
        let first_slot = slot(first_hash, depth);
        let second_slot = slot(second_hash, depth);

        if first_slot == second_slot {
            let child = Node::pair(first, first_hash, second, second_hash, depth + 1);
            return Node::Branch(Branch {
                occ: 1u64 << first_slot,
                count,
                children: vec![Arc::new(child)],
            });
        }

        let children = if first_slot < second_slot {
            vec![first, second]
        } else {
            vec![second, first]
        };
        Node::Branch(Branch {
            occ: (1u64 << first_slot) | (1u64 << second_slot),
            count,
            children,
        })
    }
}

impl<E> Branch<E> {
    /// Builds a branch from children ordered by bit, recomputing the cached count.
    pub(crate) fn new(occ: u64, children: Vec<Arc<Node<E>>>) -> Self {
        debug_assert_eq!(occ.count_ones() as usize, children.len());
        let count = children.iter().map(|child| child.count()).sum();
        Branch {
            occ,
            count,
            children,
        }
    }

    #[inline]
    pub(crate) fn child(&self, bit: u32) -> Option<&Arc<Node<E>>> {
        if test_bit(self.occ, bit) {
            Some(&self.children[popcount(self.occ, bit)])
        } else {
            None
        }
    }
}

impl<E: Entry> Node<E> {
    /// Expands a mask-leaf into the shape repeated insertion of its members would have
    /// produced: one bucket per member under a root branch, or a lone bucket.
    pub(crate) fn from_mask(bits: u64) -> Arc<Self> {
        debug_assert_ne!(bits, 0, "empty mask-leaf");
        let mut children = Vec::with_capacity(bits.count_ones() as usize);
        let mut rest = bits;
        while rest != 0 {
            let bit = rest.trailing_zeros();
            rest &= rest - 1;
            match E::from_mask_index(bit) {
                Some(entry) => children.push(Arc::new(Node::bucket(bit as u64, entry))),
                None => unreachable!("mask-leaf bit {bit} has no key"),
            }
        }
        if children.len() == 1 {
            return children.swap_remove(0);
        }
        Arc::new(Node::Branch(Branch::new(bits, children)))
    }
}

#[cfg(test)]
impl<E: Entry> Node<E> {
    /// Walks the subtree checking bitmap/array agreement, cached counts and hash
    /// placement. Returns the entry count.
    pub(crate) fn validate(&self, depth: u32, prefix: u64) -> usize {
        use crate::trie_key::TrieKey;

        let prefix_mask = if depth == 0 {
            0
        } else {
            (1u64 << (depth * BITS_PER_LEVEL).min(63)) - 1
        };
        match self {
            Node::Branch(branch) => {
                assert_ne!(branch.occ, 0, "empty branch at depth {depth}");
                assert_eq!(branch.occ.count_ones() as usize, branch.children.len());
                let mut total = 0;
                let mut rest = branch.occ;
                for child in &branch.children {
                    let bit = rest.trailing_zeros();
                    rest &= rest - 1;
                    let child_prefix = prefix | ((bit as u64) << (depth * BITS_PER_LEVEL));
                    total += child.validate(depth + 1, child_prefix);
                }
                assert!(total >= 2, "branch holding fewer than two entries");
                assert_eq!(branch.count, total, "stale count at depth {depth}");
                total
            }
            Node::Bucket(bucket) => {
                assert!(!bucket.entries.is_empty());
                assert_eq!(bucket.hash & prefix_mask, prefix & prefix_mask);
                for (i, entry) in bucket.entries.iter().enumerate() {
                    assert_eq!(entry.key().trie_hash(), bucket.hash);
                    for other in &bucket.entries[i + 1..] {
                        assert!(entry.key() != other.key(), "duplicate key in bucket");
                    }
                }
                bucket.entries.len()
            }
            Node::Mask(bits) => {
                assert_eq!(depth, 0, "mask-leaf below the root");
                assert_ne!(*bits, 0);
                bits.count_ones() as usize
            }
        }
    }
}
