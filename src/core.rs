//! Core traits shared by every sorting and selection algorithm.
//!
//! This module defines:
//! - [`Sortable`]: the compare/swap/pivot contract the comparison sorters run on.
//! - [`MergeSortable`]: the extra save/restore slots the stable merge sort needs.
//! - [`ByteAt`]: the byte-at-a-time view the radix sorter and selector run on.
//! - [`KeyAccessor`]: read-only access to collections of byte keys.

use crate::intro::{IntroSelector, IntroSorter};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// An indexable collection that can be reordered by comparisons.
///
/// Algorithms only ever address slots inside the `[from, to)` range they were
/// given. Methods take `&mut self` so implementors can reuse scratch buffers
/// while reading keys.
pub trait Sortable {
    /// Compares the entries in slots `i` and `j`.
    fn compare(&mut self, i: usize, j: usize) -> Ordering;

    /// Swaps the entries in slots `i` and `j`.
    fn swap(&mut self, i: usize, j: usize);

    /// Captures the entry currently in slot `i` as the pivot.
    ///
    /// The pivot must be a snapshot of the value: algorithms keep comparing
    /// against it after slot `i` has been swapped away.
    fn set_pivot(&mut self, i: usize);

    /// Compares the captured pivot with the entry in slot `j`.
    fn compare_pivot(&mut self, j: usize) -> Ordering;
}

/// A [`Sortable`] with temporary storage, as required by
/// [`TimSorter`](crate::timsort::TimSorter).
pub trait MergeSortable: Sortable {
    /// Copies the entry in slot `src` to slot `dest`.
    fn copy(&mut self, src: usize, dest: usize);

    /// Saves slots `i..i + len` into temporary storage positions `0..len`.
    fn save(&mut self, i: usize, len: usize);

    /// Restores temporary entry `i` into slot `j`.
    fn restore(&mut self, i: usize, j: usize);

    /// Compares temporary entry `i` with the entry in slot `j`.
    fn compare_saved(&mut self, i: usize, j: usize) -> Ordering;
}

/// A collection of byte sequences reordered one byte position at a time.
///
/// `byte_at(i, k)` returns `None` once the sequence in slot `i` has ended,
/// which orders shorter sequences before their extensions.
pub trait ByteAt {
    /// Byte `k` of the sequence in slot `i`, or `None` past its end.
    fn byte_at(&mut self, i: usize, k: usize) -> Option<u8>;

    /// Swaps the sequences in slots `i` and `j`.
    fn swap(&mut self, i: usize, j: usize);

    /// Sorts `[from, to)` when the radix sort stops partitioning.
    ///
    /// All sequences in the range share their first `k` bytes. The default
    /// runs an [`IntroSorter`] comparing from byte `k` onward.
    fn fallback_sort(&mut self, from: usize, to: usize, k: usize, max_length: usize) {
        IntroSorter::new().sort_range(&mut SuffixKeys::new(self, k, max_length), from, to);
    }

    /// Selects rank `rank` in `[from, to)` when the radix select stops partitioning.
    ///
    /// All sequences in the range share their first `k` bytes. The default
    /// runs an [`IntroSelector`] comparing from byte `k` onward.
    fn fallback_select(&mut self, from: usize, to: usize, rank: usize, k: usize, max_length: usize) {
        IntroSelector::new().select_range(&mut SuffixKeys::new(self, k, max_length), from, to, rank);
    }
}

/// Compares the suffixes starting at byte `k` of a [`ByteAt`] collection.
///
/// The pivot is copied out byte by byte, so it survives the swaps the
/// comparison sorters perform.
pub(crate) struct SuffixKeys<'a, T: ByteAt + ?Sized> {
    keys: &'a mut T,
    k: usize,
    max_length: usize,
    pivot: Vec<u8>,
}

impl<'a, T: ByteAt + ?Sized> SuffixKeys<'a, T> {
    pub(crate) fn new(keys: &'a mut T, k: usize, max_length: usize) -> Self {
        Self {
            keys,
            k,
            max_length,
            pivot: Vec::new(),
        }
    }
}

impl<T: ByteAt + ?Sized> Sortable for SuffixKeys<'_, T> {
    fn compare(&mut self, i: usize, j: usize) -> Ordering {
        for o in self.k..self.max_length {
            let b1 = self.keys.byte_at(i, o);
            let b2 = self.keys.byte_at(j, o);
            if b1 != b2 {
                return b1.cmp(&b2);
            } else if b1.is_none() {
                break;
            }
        }
        Ordering::Equal
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.keys.swap(i, j);
    }

    fn set_pivot(&mut self, i: usize) {
        self.pivot.clear();
        for o in self.k..self.max_length {
            match self.keys.byte_at(i, o) {
                Some(b) => self.pivot.push(b),
                None => break,
            }
        }
    }

    fn compare_pivot(&mut self, j: usize) -> Ordering {
        for (o, &b1) in self.pivot.iter().enumerate() {
            let b2 = self.keys.byte_at(j, self.k + o);
            if Some(b1) != b2 {
                return Some(b1).cmp(&b2);
            }
        }
        let end = self.k + self.pivot.len();
        if end == self.max_length {
            return Ordering::Equal;
        }
        match self.keys.byte_at(j, end) {
            None => Ordering::Equal,
            Some(_) => Ordering::Less,
        }
    }
}

/// A trait for accessing key data from a collection without copying.
///
/// This trait lets the convenience functions in [`crate::algo`] order any
/// collection whose elements can be viewed as byte slices (e.g. `Vec<String>`,
/// `Vec<Vec<u8>>`, or columnar string arrays).
///
/// # Examples
///
/// ```
/// use termpool::core::KeyAccessor;
///
/// struct MyCollection {
///     data: Vec<String>,
/// }
///
/// impl KeyAccessor for MyCollection {
///     fn get_key(&self, index: usize) -> &[u8] {
///         self.data[index].as_bytes()
///     }
///
///     fn len(&self) -> usize {
///         self.data.len()
///     }
/// }
/// ```
pub trait KeyAccessor {
    /// Returns a byte slice representing the key at the given index.
    fn get_key(&self, index: usize) -> &[u8];

    /// Returns the number of items in the collection.
    fn len(&self) -> usize;

    /// Returns `true` if the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte `k` of the key at `index`, or `None` past its end.
    #[inline(always)]
    fn key_byte(&self, index: usize, k: usize) -> Option<u8> {
        self.get_key(index).get(k).copied()
    }
}

// Blanket implementation for indexable slices of byte-ref types.
impl<T: AsRef<[u8]>> KeyAccessor for [T] {
    fn get_key(&self, index: usize) -> &[u8] {
        self[index].as_ref()
    }

    fn len(&self) -> usize {
        self.len()
    }
}

// Explicit Vec impl to improve ergonomics (avoiding .as_slice()).
impl<T: AsRef<[u8]>> KeyAccessor for Vec<T> {
    fn get_key(&self, index: usize) -> &[u8] {
        self[index].as_ref()
    }

    fn len(&self) -> usize {
        self.len()
    }
}

// VecDeque provides O(1) random access, so it is suitable for index sorts.
impl<T: AsRef<[u8]>> KeyAccessor for VecDeque<T> {
    fn get_key(&self, index: usize) -> &[u8] {
        self[index].as_ref()
    }

    fn len(&self) -> usize {
        self.len()
    }
}

// Each byte of a string is a one-byte key, so the order is the byte order of
// the string. Indices refer to bytes, not chars.
impl KeyAccessor for str {
    fn get_key(&self, index: usize) -> &[u8] {
        std::slice::from_ref(&self.as_bytes()[index])
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl KeyAccessor for String {
    fn get_key(&self, index: usize) -> &[u8] {
        std::slice::from_ref(&self.as_bytes()[index])
    }

    fn len(&self) -> usize {
        self.len()
    }
}
