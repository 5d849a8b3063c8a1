//! Insertion-ordered, duplicate-free sets.
//!
//! Every grammar and automaton computation in this crate needs two things from
//! its containers at once: deterministic iteration (so that state numbers and
//! symbol orders are reproducible) and constant-time membership. The sets here
//! keep their members in a `Vec` and a value-to-position map side by side.
//!
//! There are two concrete kinds:
//!
//! - [`OrderedSet`] is the mutable builder. It is never hashed.
//! - [`FrozenOrderedSet`] is the immutable snapshot produced by
//!   [`OrderedSet::freeze`]. It is hashable and has no mutating methods, so a
//!   frozen set cannot change after it has been used as a key.
//!
//! Shared behavior lives in the capability traits [`SequenceLike`],
//! [`SetLike`] and [`MutableSetLike`].

mod frozen;
mod mutable;

use std::hash::{Hash, Hasher};
use std::ops::{Bound, RangeBounds};

use rustc_hash::FxHasher;

use crate::error::SetError;

pub use frozen::FrozenOrderedSet;
pub use mutable::OrderedSet;

/// Indexed, ordered access to the members of a set.
pub trait SequenceLike<T> {
    fn as_slice(&self) -> &[T];

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

/// Membership and position lookup, both O(1).
pub trait SetLike<T> {
    /// Position of `value`, if it is a member.
    fn position(&self, value: &T) -> Option<usize>;

    fn contains(&self, value: &T) -> bool {
        self.position(value).is_some()
    }

    /// Position of `value`, but only if that position lies within `range`.
    fn index_of<R: RangeBounds<usize>>(&self, value: &T, range: R) -> Option<usize> {
        let i = self.position(value)?;
        let after_start = match range.start_bound() {
            Bound::Included(&start) => i >= start,
            Bound::Excluded(&start) => i > start,
            Bound::Unbounded => true,
        };
        let before_end = match range.end_bound() {
            Bound::Included(&end) => i <= end,
            Bound::Excluded(&end) => i < end,
            Bound::Unbounded => true,
        };
        (after_start && before_end).then_some(i)
    }
}

/// In-place mutation. Only the builder kind implements this.
pub trait MutableSetLike<T>: SequenceLike<T> + SetLike<T> {
    /// Returns the position of `value`, appending it first if it is new.
    ///
    /// The same value always gets the same index, and a value seen for the
    /// first time gets the next free one. The LR(1) automaton numbers its
    /// states with this.
    fn push(&mut self, value: T) -> usize;

    /// Appends `value` if it is absent. Returns whether it was inserted.
    fn add(&mut self, value: T) -> bool {
        let len = self.len();
        self.push(value) == len
    }

    /// Removes `value` in O(1) by moving the current last member into its
    /// slot.
    ///
    /// This does not preserve order: the former last member now sits where
    /// `value` used to be. Use [`MutableSetLike::delete`] to keep the order of
    /// the survivors at O(k) cost.
    fn remove(&mut self, value: &T) -> bool;

    /// Removes the member at `index`, shifting every later member down.
    fn delete(&mut self, index: usize) -> Result<T, SetError>;

    /// Inserts `value` at `index`, shifting every later member up.
    fn insert(&mut self, index: usize, value: T) -> Result<(), SetError>;

    /// Replaces the member at `index` and returns the old one. Replacing a
    /// member with itself is a no-op.
    fn set(&mut self, index: usize, value: T) -> Result<T, SetError>;
}

/// Hash of a single member. A frozen set hashes to the wrapping sum of these.
pub fn hash_member<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

fn slice_range<R: RangeBounds<usize>>(range: R, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start + 1,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end + 1,
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    let end = end.min(len);
    (start.min(end), end)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn iteration_follows_first_occurrence(values in proptest::collection::vec(0u8..32, 0..64)) {
            let set: OrderedSet<u8> = values.iter().copied().collect();
            let mut expected: Vec<u8> = Vec::new();
            for v in &values {
                if !expected.contains(v) {
                    expected.push(*v);
                }
            }
            prop_assert_eq!(set.as_slice(), expected.as_slice());
            for v in 0u8..32 {
                prop_assert_eq!(set.contains(&v), values.contains(&v));
            }
        }

        #[test]
        fn push_returns_stable_index(values in proptest::collection::vec(0u8..16, 1..48)) {
            let mut set = OrderedSet::new();
            let first: Vec<usize> = values.iter().map(|v| set.push(*v)).collect();
            let second: Vec<usize> = values.iter().map(|v| set.push(*v)).collect();
            prop_assert_eq!(first, second);
            for (i, v) in set.iter().enumerate() {
                prop_assert_eq!(set.position(v), Some(i));
            }
        }

        #[test]
        fn remove_keeps_membership_exact(
            values in proptest::collection::vec(0u8..24, 0..48),
            removed in proptest::collection::vec(0u8..24, 0..16),
        ) {
            let mut set: OrderedSet<u8> = values.iter().copied().collect();
            for v in &removed {
                set.remove(v);
            }
            for v in 0u8..24 {
                prop_assert_eq!(set.contains(&v), values.contains(&v) && !removed.contains(&v));
            }
            for (i, v) in set.iter().enumerate() {
                prop_assert_eq!(set.position(v), Some(i));
            }
        }
    }

    #[test]
    fn index_of_respects_range() {
        let set: OrderedSet<&str> = ["a", "b", "c", "d"].into_iter().collect();
        assert_eq!(set.index_of(&"c", ..), Some(2));
        assert_eq!(set.index_of(&"c", 1..3), Some(2));
        assert_eq!(set.index_of(&"c", 3..), None);
        assert_eq!(set.index_of(&"c", ..2), None);
        assert_eq!(set.index_of(&"z", ..), None);
    }

    #[test]
    fn frozen_hash_is_sum_of_member_hashes() {
        let frozen = OrderedSet::from_iter(["x", "y", "z"]).freeze();
        let expected = ["x", "y", "z"]
            .iter()
            .fold(0u64, |acc, v| acc.wrapping_add(hash_member(v)));
        assert_eq!(frozen.set_hash(), expected);
        assert_eq!(frozen.set_hash(), frozen.set_hash());
    }
}
