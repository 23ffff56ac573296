//! Introspective sorting and selection.
//!
//! Quicksort / quickselect with median-of-three pivots, bounded by a recursion
//! budget of `2 * log2(n)` levels after which heap sort takes over. Neither is
//! stable.

use crate::core::Sortable;
use crate::error::{Result, check_range, check_rank};
use crate::sorter::{BINARY_SORT_THRESHOLD, binary_sort, heap_sort};
use std::cmp::Ordering;

#[inline]
fn max_depth(len: usize) -> isize {
    2 * len.max(1).ilog2() as isize
}

/// Unstable `O(n log n)` comparison sort.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntroSorter;

impl IntroSorter {
    /// Creates the sorter.
    pub fn new() -> Self {
        Self
    }

    /// Sorts `[from, to)`.
    pub fn sort<S: Sortable + ?Sized>(&self, s: &mut S, from: usize, to: usize) -> Result<()> {
        check_range(from, to)?;
        self.sort_range(s, from, to);
        Ok(())
    }

    pub(crate) fn sort_range<S: Sortable + ?Sized>(&self, s: &mut S, from: usize, to: usize) {
        quicksort(s, from, to, max_depth(to - from));
    }
}

fn quicksort<S: Sortable + ?Sized>(s: &mut S, from: usize, to: usize, mut max_depth: isize) {
    if to - from < BINARY_SORT_THRESHOLD {
        binary_sort(s, from, to);
        return;
    }
    max_depth -= 1;
    if max_depth < 0 {
        heap_sort(s, from, to);
        return;
    }

    // order from <= mid <= to - 1, leaving sentinels on both ends
    let mid = from + ((to - from) >> 1);
    if s.compare(from, mid) == Ordering::Greater {
        s.swap(from, mid);
    }
    if s.compare(mid, to - 1) == Ordering::Greater {
        s.swap(mid, to - 1);
        if s.compare(from, mid) == Ordering::Greater {
            s.swap(from, mid);
        }
    }

    let mut left = from + 1;
    let mut right = to - 2;

    s.set_pivot(mid);
    loop {
        while s.compare_pivot(right) == Ordering::Less {
            right -= 1;
        }
        while left < right && s.compare_pivot(left) != Ordering::Less {
            left += 1;
        }
        if left < right {
            s.swap(left, right);
            right -= 1;
        } else {
            break;
        }
    }

    quicksort(s, from, left + 1, max_depth);
    quicksort(s, left + 1, to, max_depth);
}

/// Expected linear-time selection of the k-th smallest entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntroSelector;

impl IntroSelector {
    /// Creates the selector.
    pub fn new() -> Self {
        Self
    }

    /// Reorders `[from, to)` so that slot `k` holds the entry that would be there
    /// after sorting, with no greater entry before it and no lesser entry after it.
    pub fn select<S: Sortable + ?Sized>(&self, s: &mut S, from: usize, to: usize, k: usize) -> Result<()> {
        check_rank(from, to, k)?;
        self.select_range(s, from, to, k);
        Ok(())
    }

    pub(crate) fn select_range<S: Sortable + ?Sized>(&self, s: &mut S, from: usize, to: usize, k: usize) {
        quickselect(s, from, to, k, max_depth(to - from));
    }
}

fn quickselect<S: Sortable + ?Sized>(s: &mut S, mut from: usize, mut to: usize, k: usize, mut max_depth: isize) {
    loop {
        debug_assert!(from <= k && k < to);
        if to - from == 1 {
            return;
        }
        max_depth -= 1;
        if max_depth < 0 {
            heap_sort(s, from, to);
            return;
        }

        // median of from, mid and to - 1 ends up in to - 1
        let mid = from + ((to - from) >> 1);
        if s.compare(from, to - 1) == Ordering::Greater {
            s.swap(from, to - 1);
        }
        if s.compare(to - 1, mid) == Ordering::Greater {
            s.swap(to - 1, mid);
            if s.compare(from, to - 1) == Ordering::Greater {
                s.swap(from, to - 1);
            }
        }

        s.set_pivot(to - 1);

        let mut left = from + 1;
        let mut right = to.saturating_sub(2).max(from);
        loop {
            while s.compare_pivot(left) == Ordering::Greater {
                left += 1;
            }
            while left < right && s.compare_pivot(right) != Ordering::Greater {
                right -= 1;
            }
            if left < right {
                s.swap(left, right);
                right -= 1;
            } else {
                break;
            }
        }
        s.swap(left, to - 1);

        match left.cmp(&k) {
            Ordering::Equal => return,
            Ordering::Less => from = left + 1,
            Ordering::Greater => to = left,
        }
    }
}
