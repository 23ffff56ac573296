//! Convenience entry points over [`KeyAccessor`] collections.
//!
//! Every function here leaves the collection untouched and works on a
//! permutation of its indices:
//! - [`sort_indices`]: MSB radix sort, unstable.
//! - [`stable_sort_indices`]: tim sort, equal keys keep their index order.
//! - [`sort_indices_by`]: intro sort under any [`BytesComparator`].
//! - [`select_indices`]: radix select of a single rank.
//!
//! [`sort_keys`] applies the radix order to a slice in place.

use crate::comparator::{BytesComparator, Unsigned};
use crate::config::RadixConfig;
use crate::core::{ByteAt, KeyAccessor, MergeSortable, Sortable};
use crate::error::Result;
use crate::intro::IntroSorter;
use crate::radix::{MsbRadixSorter, RadixSelector};
use crate::timsort::TimSorter;
use std::cmp::Ordering;

/// Returns the indices that order `provider` by unsigned lexicographic key order.
///
/// The collection itself is not modified.
///
/// # Examples
///
/// ```
/// use termpool::sort_indices;
///
/// let data = vec!["banana", "apple", "cherry"];
/// let indices = sort_indices(&data);
///
/// assert_eq!(indices, vec![1, 0, 2]); // apple, banana, cherry
/// ```
pub fn sort_indices<T: KeyAccessor + ?Sized>(provider: &T) -> Vec<usize> {
    let mut order = IndexOrder::new(provider, Unsigned);
    let len = order.perm.len();
    MsbRadixSorter::new(RadixConfig::default()).sort_range(&mut order, 0, len);
    order.perm
}

/// Sorts a mutable slice in place.
///
/// Computes the order with [`sort_indices`] and then applies the permutation.
///
/// # Examples
///
/// ```
/// use termpool::sort_keys;
///
/// let mut data = vec!["banana", "apple", "cherry"];
/// sort_keys(&mut data);
///
/// assert_eq!(data, vec!["apple", "banana", "cherry"]);
/// ```
pub fn sort_keys<T: AsRef<[u8]>>(data: &mut [T]) {
    let indices = sort_indices(&*data);
    apply_permutation(data, indices);
}

fn apply_permutation<T>(data: &mut [T], mut indices: Vec<usize>) {
    for i in 0..data.len() {
        let mut current = i;
        while indices[current] != i {
            let next = indices[current];
            data.swap(current, next);
            indices[current] = current;
            current = next;
        }
        indices[current] = current;
    }
}

/// Like [`sort_indices`], but equal keys keep their original relative order.
pub fn stable_sort_indices<T: KeyAccessor + ?Sized>(provider: &T) -> Vec<usize> {
    let mut order = IndexOrder::new(provider, Unsigned);
    let len = order.perm.len();
    TimSorter::new(len / 64).sort_range(&mut order, 0, len);
    order.perm
}

/// Returns the indices that order `provider` under `comparator`.
///
/// ```
/// use termpool::algo::sort_indices_by;
/// use termpool::comparator::FixedWidth;
///
/// let keys: Vec<[u8; 4]> = [300u32, 7, 65536].iter().map(|v| v.to_be_bytes()).collect();
/// assert_eq!(sort_indices_by(&keys, &FixedWidth::<4>), vec![1, 0, 2]);
/// ```
pub fn sort_indices_by<T, C>(provider: &T, comparator: &C) -> Vec<usize>
where
    T: KeyAccessor + ?Sized,
    C: BytesComparator + ?Sized,
{
    let mut order = IndexOrder::new(provider, comparator);
    let len = order.perm.len();
    IntroSorter::new().sort_range(&mut order, 0, len);
    order.perm
}

/// Returns a permutation of the indices whose slot `k` holds the index of the
/// k-th smallest key, with no greater key before it and no lesser key after.
///
/// # Errors
///
/// [`Error::RankOutOfRange`](crate::error::Error::RankOutOfRange) if `k >= provider.len()`.
pub fn select_indices<T: KeyAccessor + ?Sized>(provider: &T, k: usize) -> Result<Vec<usize>> {
    let mut order = IndexOrder::new(provider, Unsigned);
    let len = order.perm.len();
    RadixSelector::new(RadixConfig::default()).select(&mut order, 0, len, k)?;
    Ok(order.perm)
}

/// A permutation of a collection's indices, ordered by the keys they point at.
struct IndexOrder<'a, T: ?Sized, C> {
    provider: &'a T,
    comparator: C,
    perm: Vec<usize>,
    /// Original index of the pivot; keys never move, so it stays valid.
    pivot: usize,
    saved: Vec<usize>,
}

impl<'a, T: KeyAccessor + ?Sized, C: BytesComparator> IndexOrder<'a, T, C> {
    fn new(provider: &'a T, comparator: C) -> Self {
        Self {
            provider,
            comparator,
            perm: (0..provider.len()).collect(),
            pivot: 0,
            saved: Vec::new(),
        }
    }

    #[inline(always)]
    fn compare_keys(&self, a: usize, b: usize) -> Ordering {
        self.comparator
            .compare(self.provider.get_key(a), self.provider.get_key(b))
    }
}

impl<T: KeyAccessor + ?Sized, C: BytesComparator> Sortable for IndexOrder<'_, T, C> {
    fn compare(&mut self, i: usize, j: usize) -> Ordering {
        self.compare_keys(self.perm[i], self.perm[j])
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.perm.swap(i, j);
    }

    fn set_pivot(&mut self, i: usize) {
        self.pivot = self.perm[i];
    }

    fn compare_pivot(&mut self, j: usize) -> Ordering {
        self.compare_keys(self.pivot, self.perm[j])
    }
}

impl<T: KeyAccessor + ?Sized, C: BytesComparator> MergeSortable for IndexOrder<'_, T, C> {
    fn copy(&mut self, src: usize, dest: usize) {
        self.perm[dest] = self.perm[src];
    }

    fn save(&mut self, i: usize, len: usize) {
        self.saved.clear();
        self.saved.extend_from_slice(&self.perm[i..i + len]);
    }

    fn restore(&mut self, i: usize, j: usize) {
        self.perm[j] = self.saved[i];
    }

    fn compare_saved(&mut self, i: usize, j: usize) -> Ordering {
        self.compare_keys(self.saved[i], self.perm[j])
    }
}

impl<T: KeyAccessor + ?Sized, C> ByteAt for IndexOrder<'_, T, C> {
    #[inline(always)]
    fn byte_at(&mut self, i: usize, k: usize) -> Option<u8> {
        self.provider.key_byte(self.perm[i], k)
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.perm.swap(i, j);
    }
}
