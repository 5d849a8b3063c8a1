use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::RangeBounds;

use rustc_hash::FxHashMap;

use super::{hash_member, slice_range, OrderedSet, SequenceLike, SetLike};

/// Immutable, hashable, insertion-ordered set.
///
/// Obtained from [`OrderedSet::freeze`] or collected directly from an
/// iterator. There is no way back to a mutable set short of building a new
/// one, and no method here takes `&mut self`:
///
/// ```compile_fail
/// use lr1_syntax::ordered_set::{FrozenOrderedSet, MutableSetLike};
///
/// let mut frozen: FrozenOrderedSet<u32> = [1, 2, 3].into_iter().collect();
/// frozen.add(4);
/// ```
///
/// The hash is the wrapping sum of the member hashes, so it agrees with the
/// order-insensitive equality. It is computed once, when the set is frozen.
#[derive(Clone)]
pub struct FrozenOrderedSet<T> {
    values: Vec<T>,
    indexes: FxHashMap<T, usize>,
    hash: u64,
}

impl<T: Hash> FrozenOrderedSet<T> {
    pub(super) fn from_parts(values: Vec<T>, indexes: FxHashMap<T, usize>) -> Self {
        let hash = values
            .iter()
            .fold(0u64, |acc, v| acc.wrapping_add(hash_member(v)));
        Self {
            values,
            indexes,
            hash,
        }
    }

    /// The cached order-independent hash.
    pub fn set_hash(&self) -> u64 {
        self.hash
    }
}

impl<T: Clone + Eq + Hash> FrozenOrderedSet<T> {
    pub fn empty() -> Self {
        OrderedSet::new().freeze()
    }

    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Self {
        let (start, end) = slice_range(range, self.values.len());
        self.values[start..end].iter().cloned().collect()
    }
}

impl<T> SequenceLike<T> for FrozenOrderedSet<T> {
    fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T: Eq + Hash> SetLike<T> for FrozenOrderedSet<T> {
    fn position(&self, value: &T) -> Option<usize> {
        self.indexes.get(value).copied()
    }
}

impl<T: Clone + Eq + Hash> FromIterator<T> for FrozenOrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().collect::<OrderedSet<T>>().freeze()
    }
}

impl<T: Clone + Eq + Hash> From<OrderedSet<T>> for FrozenOrderedSet<T> {
    fn from(set: OrderedSet<T>) -> Self {
        set.freeze()
    }
}

impl<'a, T> IntoIterator for &'a FrozenOrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T: Eq + Hash> PartialEq for FrozenOrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.values.len() == other.values.len()
            && self.values.iter().all(|v| other.indexes.contains_key(v))
    }
}

impl<T: Eq + Hash> Eq for FrozenOrderedSet<T> {}

impl<T> Hash for FrozenOrderedSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl<T: fmt::Debug> fmt::Debug for FrozenOrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.iter()).finish()
    }
}
