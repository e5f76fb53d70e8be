//! Constructors that build a `Set` straight from arithmetic progressions and bitmaps.

use std::sync::Arc;

use crate::entry::SetEntry;
use crate::error::Error;
use crate::node::Node;
use crate::set::Set;
use crate::trie;
use crate::trie_key::TrieKey;
use crate::Result;

impl<K: TrieKey + Clone> Set<K> {
    /// Builds a set of the integers `i` in `0..64` whose bit `i` is set in `mask`.
    ///
    /// The set is stored as the mask itself: one allocation, however many bits are set.
    ///
    /// # Panics
    ///
    /// Panics if a set bit has no corresponding key of type `K` (bit 2 for `bool`, say).
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let set: Set<u8> = Set::from_mask64(0b1001_0110);
    /// assert_eq!(set.count(), 4);
    /// assert!(set.has(&1) && set.has(&7));
    /// assert!(!set.has(&0));
    /// assert_eq!(Set::<u8>::from_mask64(0), Set::new());
    /// ```
    pub fn from_mask64(mask: u64) -> Self {
        if mask == 0 {
            return Set::new();
        }
        let mut rest = mask;
        while rest != 0 {
            let bit = rest.trailing_zeros();
            rest &= rest - 1;
            if K::from_trie_hash(bit as u64).is_none() {
                panic!("mask bit {bit} does not correspond to a key");
            }
        }
        Set {
            root: Some(Arc::new(Node::Mask(mask))),
            size: mask.count_ones() as usize,
        }
    }
}

impl Set<i64> {
    /// Builds the set `start, start + step, start + 2*step, ...` of values strictly before
    /// `end`, counting in the direction of `step`.
    ///
    /// `start == end` always gives the empty set. Small non-negative ranges become a single
    /// mask node; larger ones are built level by level.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroStep`] if `step` is zero and the bounds differ, and
    /// [`Error::UnreachableEnd`] if `step` points away from `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::{Error, Set};
    /// let odd = Set::try_from_range(5, -1, -2).unwrap();
    /// assert_eq!(odd, Set::from([1, 3, 5]));
    ///
    /// assert!(Set::try_from_range(3, 3, 0).unwrap().is_empty());
    /// assert_eq!(
    ///     Set::try_from_range(1, 2, 0),
    ///     Err(Error::ZeroStep { start: 1, end: 2 })
    /// );
    /// ```
    pub fn try_from_range(start: i64, end: i64, step: i64) -> Result<Self> {
        if start == end {
            return Ok(Set::new());
        }
        if step == 0 {
            log::debug!("rejecting range {start}..{end} with zero step");
            return Err(Error::ZeroStep { start, end });
        }
        if (step > 0 && start > end) || (step < 0 && start < end) {
            log::debug!("rejecting range {start}..{end} with step {step}");
            return Err(Error::UnreachableEnd { start, end, step });
        }

        let distance = (i128::from(end) - i128::from(start)).unsigned_abs();
        let stride = i128::from(step).unsigned_abs();
        let len = distance.div_ceil(stride);
        let last = i128::from(start) + (len as i128 - 1) * i128::from(step);
        let (low, high) = (i128::from(start).min(last), i128::from(start).max(last));

        let values = (0..len).map(|i| (i128::from(start) + i as i128 * i128::from(step)) as i64);
        if low >= 0 && high < 64 {
            let mask = values.fold(0u64, |mask, value| mask | (1u64 << value));
            return Ok(Set::from_mask64(mask));
        }

        let entries = values
            .map(|value| (value.trie_hash(), SetEntry(value)))
            .collect();
        Ok(Set::from_root(trie::build(entries, 0)))
    }

    /// Like [`try_from_range`](Set::try_from_range), but panics on invalid arguments.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero with distinct bounds, or points away from `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_trie::Set;
    /// let set = Set::from_range(1, 6, 2);
    /// assert_eq!(set, Set::from([1, 3, 5]));
    /// ```
    pub fn from_range(start: i64, end: i64, step: i64) -> Self {
        match Self::try_from_range(start, end, step) {
            Ok(set) => set,
            Err(err) => panic!("{err}"),
        }
    }

    /// The set `0, 1, ..., n - 1`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is negative.
    pub fn upto(n: i64) -> Self {
        Self::from_range(0, n, 1)
    }

    /// The set `start, start + 1, ..., end - 1`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn from_span(start: i64, end: i64) -> Self {
        Self::from_range(start, end, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn members(set: &Set<i64>) -> Vec<i64> {
        let mut members: Vec<_> = set.iter().collect();
        members.sort();
        members
    }

    #[test]
    fn test_upto() {
        assert_eq!(Set::upto(0), Set::new());
        assert_eq!(members(&Set::upto(1)), vec![0]);
        assert_eq!(members(&Set::upto(6)), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_from_span() {
        assert_eq!(Set::from_span(6, 6), Set::new());
        assert_eq!(members(&Set::from_span(5, 6)), vec![5]);
        assert_eq!(members(&Set::from_span(1, 6)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_from_range_steps() {
        assert_eq!(Set::from_range(1, 1, 0), Set::new());
        assert_eq!(Set::from_range(0, 0, 7), Set::new());
        assert_eq!(members(&Set::from_range(1, 6, 2)), vec![1, 3, 5]);
        assert_eq!(members(&Set::from_range(1, 7, 2)), vec![1, 3, 5]);
        assert_eq!(members(&Set::from_range(5, 0, -2)), vec![1, 3, 5]);
        assert_eq!(members(&Set::from_range(5, -1, -2)), vec![1, 3, 5]);
        assert_eq!(members(&Set::from_range(-3, 3, 2)), vec![-3, -1, 1]);
    }

    #[test]
    fn test_from_range_rejects_bad_steps() {
        assert_eq!(
            Set::try_from_range(1, 2, 0),
            Err(Error::ZeroStep { start: 1, end: 2 })
        );
        assert_eq!(
            Set::try_from_range(5, 1, 1),
            Err(Error::UnreachableEnd { start: 5, end: 1, step: 1 })
        );
        assert_eq!(
            Set::try_from_range(1, 5, -1),
            Err(Error::UnreachableEnd { start: 1, end: 5, step: -1 })
        );
    }

    #[test]
    #[should_panic(expected = "zero step size")]
    fn test_from_range_panics_on_zero_step() {
        Set::from_range(1, 2, 0);
    }

    #[test]
    fn test_small_ranges_become_masks() {
        let set = Set::from_range(0, 64, 1);
        assert!(matches!(set.root.as_deref(), Some(Node::Mask(u64::MAX))));
        assert_eq!(set.count(), 64);

        let wide = Set::from_range(0, 65, 1);
        assert!(matches!(wide.root.as_deref(), Some(Node::Branch(_))));
        assert_eq!(wide.count(), 65);
        assert_eq!(wide, (0..65).collect::<Set<i64>>());
    }

    #[test]
    fn test_large_range_matches_insertion() {
        let ranged = Set::from_range(-5000, 100_000, 7);
        let mut inserted = Set::new();
        let mut value = -5000;
        while value < 100_000 {
            inserted = inserted.with(value);
            value += 7;
        }
        assert_eq!(ranged.count(), inserted.count());
        assert_eq!(ranged, inserted);
        ranged.root.as_ref().unwrap().validate(0, 0);
    }

    #[test]
    fn test_mask_membership() {
        for i in 0..64 {
            let single = Set::<i64>::from_mask64(1 << i);
            assert_eq!(single, Set::new().with(i as i64), "bit {i}");
            assert_eq!(Set::<i64>::from_mask64((1u64 << i) - 1), Set::upto(i as i64), "bit {i}");
        }
    }

    #[test]
    fn test_mask_grows_past_small_integers() {
        let set = Set::<i64>::from_mask64(0b111).with(3).with(1000);
        assert_eq!(members(&set), vec![0, 1, 2, 3, 1000]);
        set.root.as_ref().unwrap().validate(0, 0);

        let smaller = Set::<i64>::from_mask64(0b111).without(&1);
        assert_eq!(members(&smaller), vec![0, 2]);
        assert!(Set::<i64>::from_mask64(0b1).without(&0).is_empty());
    }

    #[test]
    #[should_panic(expected = "does not correspond to a key")]
    fn test_mask_rejects_keys_out_of_range() {
        Set::<bool>::from_mask64(0b100);
    }
}
