use std::fmt;
use std::hash::Hash;
use std::ops::RangeBounds;

use rustc_hash::FxHashMap;

use super::{slice_range, FrozenOrderedSet, MutableSetLike, SequenceLike, SetLike};
use crate::error::SetError;

/// Mutable, insertion-ordered set. See the [module docs](super).
#[derive(Clone)]
pub struct OrderedSet<T> {
    values: Vec<T>,
    indexes: FxHashMap<T, usize>,
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            indexes: FxHashMap::default(),
        }
    }

    /// A new set holding the members at positions in `range`, in order.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Self {
        let (start, end) = slice_range(range, self.values.len());
        self.values[start..end].iter().cloned().collect()
    }

    /// One-way conversion into the hashable snapshot.
    pub fn freeze(self) -> FrozenOrderedSet<T> {
        FrozenOrderedSet::from_parts(self.values, self.indexes)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, value) in self.values.iter().enumerate().skip(start) {
            self.indexes.insert(value.clone(), i);
        }
    }

    fn check_absent(&self, value: &T) -> Result<(), SetError> {
        match self.indexes.get(value) {
            Some(&index) => Err(SetError::Duplicate { index }),
            None => Ok(()),
        }
    }
}

impl<T> SequenceLike<T> for OrderedSet<T> {
    fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T: Eq + Hash> SetLike<T> for OrderedSet<T> {
    fn position(&self, value: &T) -> Option<usize> {
        self.indexes.get(value).copied()
    }
}

impl<T: Clone + Eq + Hash> MutableSetLike<T> for OrderedSet<T> {
    fn push(&mut self, value: T) -> usize {
        if let Some(&i) = self.indexes.get(&value) {
            return i;
        }
        let i = self.values.len();
        self.indexes.insert(value.clone(), i);
        self.values.push(value);
        i
    }

    fn remove(&mut self, value: &T) -> bool {
        let Some(i) = self.indexes.remove(value) else {
            return false;
        };
        self.values.swap_remove(i);
        if let Some(filler) = self.values.get(i) {
            self.indexes.insert(filler.clone(), i);
        }
        true
    }

    fn delete(&mut self, index: usize) -> Result<T, SetError> {
        if index >= self.values.len() {
            return Err(SetError::OutOfRange {
                index,
                len: self.values.len(),
            });
        }
        let value = self.values.remove(index);
        self.indexes.remove(&value);
        self.reindex_from(index);
        Ok(value)
    }

    fn insert(&mut self, index: usize, value: T) -> Result<(), SetError> {
        if index > self.values.len() {
            return Err(SetError::OutOfRange {
                index,
                len: self.values.len(),
            });
        }
        self.check_absent(&value)?;
        self.values.insert(index, value);
        self.reindex_from(index);
        Ok(())
    }

    fn set(&mut self, index: usize, value: T) -> Result<T, SetError> {
        let Some(old) = self.values.get(index) else {
            return Err(SetError::OutOfRange {
                index,
                len: self.values.len(),
            });
        };
        if *old == value {
            return Ok(value);
        }
        self.check_absent(&value)?;
        self.indexes.insert(value.clone(), index);
        let old = std::mem::replace(&mut self.values[index], value);
        self.indexes.remove(&old);
        Ok(old)
    }
}

impl<T: Clone + Eq + Hash> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Clone + Eq + Hash> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Set equality: same members, order ignored.
impl<T: Eq + Hash> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self.values.iter().all(|v| other.indexes.contains_key(v))
    }
}

impl<T: Eq + Hash> Eq for OrderedSet<T> {}

impl<T: fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.iter()).finish()
    }
}
