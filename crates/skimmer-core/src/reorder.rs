//! Stable reorder of output collections
//!
//! Sorting an output collection invalidates every side table that was keyed
//! by fill order. [`Permutation`] records where each filled entry went so that
//! identity maps can be rewritten before the link phase consults them.

use crate::error::{Result, SkimError};
use serde::{Serialize, Serializer};
use std::ops::Index;

/// Bijection over `[0, N)` between fill order and sorted order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    /// fill index -> sorted index
    to_sorted: Vec<usize>,
    /// sorted index -> fill index
    to_fill: Vec<usize>,
}

impl Permutation {
    pub fn identity(len: usize) -> Self {
        Self {
            to_sorted: (0..len).collect(),
            to_fill: (0..len).collect(),
        }
    }

    /// Build from the list of fill indices in sorted order.
    ///
    /// Fails unless `to_fill` contains every index in `[0, len)` exactly once.
    pub fn from_fill_order(to_fill: Vec<usize>) -> Result<Self> {
        let len = to_fill.len();
        let mut to_sorted = vec![usize::MAX; len];
        for (sorted, &fill) in to_fill.iter().enumerate() {
            if fill >= len {
                return Err(SkimError::InvalidPermutation(format!(
                    "index {} out of range for length {}",
                    fill, len
                )));
            }
            if to_sorted[fill] != usize::MAX {
                return Err(SkimError::InvalidPermutation(format!(
                    "index {} appears more than once",
                    fill
                )));
            }
            to_sorted[fill] = sorted;
        }
        Ok(Self { to_sorted, to_fill })
    }

    pub fn len(&self) -> usize {
        self.to_fill.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_fill.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.to_fill.iter().enumerate().all(|(i, &f)| i == f)
    }

    pub fn sorted_index(&self, fill: usize) -> Option<usize> {
        self.to_sorted.get(fill).copied()
    }

    pub fn fill_index(&self, sorted: usize) -> Option<usize> {
        self.to_fill.get(sorted).copied()
    }

    /// Fill indices listed in sorted order
    pub fn fill_order(&self) -> &[usize] {
        &self.to_fill
    }

    pub fn inverse(&self) -> Self {
        Self {
            to_sorted: self.to_fill.clone(),
            to_fill: self.to_sorted.clone(),
        }
    }

    /// Reorder data laid out in fill order into sorted order
    pub fn apply<T>(&self, items: Vec<T>) -> Result<Vec<T>> {
        if items.len() != self.len() {
            return Err(SkimError::InvalidPermutation(format!(
                "cannot apply permutation of length {} to {} items",
                self.len(),
                items.len()
            )));
        }
        Ok(self.reorder(items))
    }

    /// `items.len()` must equal `self.len()`
    fn reorder<T>(&self, items: Vec<T>) -> Vec<T> {
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        self.to_fill
            .iter()
            .filter_map(|&fill| slots[fill].take())
            .collect()
    }
}

/// Stable sort of `items` by descending `key`.
///
/// Entries with equal keys keep their relative order. Keys are compared with
/// `f64::total_cmp`, so NaN never breaks the ordering.
pub fn stable_sort_desc<T, F>(items: &[T], key: F) -> Permutation
where
    F: Fn(&T) -> f64,
{
    let keys: Vec<f64> = items.iter().map(key).collect();
    let mut to_fill: Vec<usize> = (0..items.len()).collect();
    to_fill.sort_by(|&a, &b| keys[b].total_cmp(&keys[a]));

    let mut to_sorted = vec![0; to_fill.len()];
    for (sorted, &fill) in to_fill.iter().enumerate() {
        to_sorted[fill] = sorted;
    }
    Permutation { to_sorted, to_fill }
}

/// Ordered, append-only-until-sorted sequence of output entries
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    entries: Vec<T>,
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a default entry and return it for filling
    pub fn create_back(&mut self) -> &mut T
    where
        T: Default,
    {
        self.entries.push(T::default());
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.entries.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.entries
    }

    /// Sort in place by descending `key`, returning the permutation applied
    pub fn sort_desc_by<F>(&mut self, key: F) -> Permutation
    where
        F: Fn(&T) -> f64,
    {
        let perm = stable_sort_desc(&self.entries, key);
        self.entries = perm.reorder(std::mem::take(&mut self.entries));
        perm
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(entries: Vec<T>) -> Self {
        Self { entries }
    }
}

impl<T> Index<usize> for Collection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.entries[index]
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
