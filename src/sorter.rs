//! Building blocks shared by the comparison sorters.
//!
//! Everything here runs on the [`Sortable`] contract only, so the same binary
//! insertion sort, heap sort and in-place merge back the intro sort, the tim
//! sort, the selectors and the radix fallbacks.

use crate::core::Sortable;
use crate::error::{Result, check_range};
use std::cmp::Ordering;

/// Ranges shorter than this are sorted with binary insertion sort.
pub const BINARY_SORT_THRESHOLD: usize = 20;

/// Sorts `[from, to)` with binary insertion sort.
pub fn binary_sort<S: Sortable + ?Sized>(s: &mut S, from: usize, to: usize) {
    binary_sort_from(s, from, to, from + 1);
}

/// Binary insertion sort of `[from, to)` given that `[from, start)` is already sorted.
///
/// Stable: an entry is inserted after all entries equal to it.
pub fn binary_sort_from<S: Sortable + ?Sized>(s: &mut S, from: usize, to: usize, start: usize) {
    for i in start..to {
        s.set_pivot(i);
        let mut l = from;
        let mut h = i;
        while l < h {
            let mid = l + ((h - l) >> 1);
            if s.compare_pivot(mid) == Ordering::Less {
                h = mid;
            } else {
                l = mid + 1;
            }
        }
        for j in (l + 1..=i).rev() {
            s.swap(j - 1, j);
        }
    }
}

/// Sorts `[from, to)` with heap sort.
pub fn heap_sort<S: Sortable + ?Sized>(s: &mut S, from: usize, to: usize) {
    if to - from <= 1 {
        return;
    }
    heapify(s, from, to);
    for end in (from + 1..to).rev() {
        s.swap(from, end);
        sift_down(s, from, from, end);
    }
}

fn heapify<S: Sortable + ?Sized>(s: &mut S, from: usize, to: usize) {
    for i in (from..=heap_parent(from, to - 1)).rev() {
        sift_down(s, i, from, to);
    }
}

fn sift_down<S: Sortable + ?Sized>(s: &mut S, mut i: usize, from: usize, to: usize) {
    loop {
        let left = heap_child(from, i);
        if left >= to {
            break;
        }
        let right = left + 1;
        if s.compare(i, left) == Ordering::Less {
            if right < to && s.compare(left, right) == Ordering::Less {
                s.swap(i, right);
                i = right;
            } else {
                s.swap(i, left);
                i = left;
            }
        } else if right < to && s.compare(i, right) == Ordering::Less {
            s.swap(i, right);
            i = right;
        } else {
            break;
        }
    }
}

#[inline]
fn heap_parent(from: usize, i: usize) -> usize {
    ((i - 1 - from) >> 1) + from
}

#[inline]
fn heap_child(from: usize, i: usize) -> usize {
    ((i - from) << 1) + 1 + from
}

/// Reverses `[from, to)`.
pub fn reverse<S: Sortable + ?Sized>(s: &mut S, mut from: usize, to: usize) {
    if to <= from {
        return;
    }
    let mut to = to - 1;
    while from < to {
        s.swap(from, to);
        from += 1;
        to -= 1;
    }
}

/// Rotates `[lo, hi)` so that `mid` becomes the first slot, using swaps only.
pub fn rotate<S: Sortable + ?Sized>(s: &mut S, mut lo: usize, mut mid: usize, hi: usize) {
    debug_assert!(lo <= mid && mid <= hi);
    if lo == mid || mid == hi {
        return;
    }
    if mid - lo == hi - mid {
        // equal halves: one pass of swaps
        while mid < hi {
            s.swap(lo, mid);
            lo += 1;
            mid += 1;
        }
    } else {
        reverse(s, lo, mid);
        reverse(s, mid, hi);
        reverse(s, lo, hi);
    }
}

/// First slot in `[from, to)` whose entry is not less than the entry at `val`.
pub(crate) fn lower<S: Sortable + ?Sized>(s: &mut S, mut from: usize, to: usize, val: usize) -> usize {
    let mut len = to - from;
    while len > 0 {
        let half = len >> 1;
        let mid = from + half;
        if s.compare(mid, val) == Ordering::Less {
            from = mid + 1;
            len = len - half - 1;
        } else {
            len = half;
        }
    }
    from
}

/// First slot in `[from, to)` whose entry is greater than the entry at `val`.
pub(crate) fn upper<S: Sortable + ?Sized>(s: &mut S, mut from: usize, to: usize, val: usize) -> usize {
    let mut len = to - from;
    while len > 0 {
        let half = len >> 1;
        let mid = from + half;
        if s.compare(val, mid) == Ordering::Less {
            len = half;
        } else {
            from = mid + 1;
            len = len - half - 1;
        }
    }
    from
}

/// Like [`lower`], galloping from the end; faster when the answer is near `to`.
pub(crate) fn lower2<S: Sortable + ?Sized>(s: &mut S, from: usize, to: usize, val: usize) -> usize {
    let mut f = to as isize - 1;
    let mut t = to;
    while f > from as isize {
        if s.compare(f as usize, val) == Ordering::Less {
            return lower(s, f as usize, t, val);
        }
        let delta = t - f as usize;
        t = f as usize;
        f -= (delta << 1) as isize;
    }
    lower(s, from, t, val)
}

/// Like [`upper`], galloping from the start; faster when the answer is near `from`.
pub(crate) fn upper2<S: Sortable + ?Sized>(s: &mut S, from: usize, to: usize, val: usize) -> usize {
    let mut f = from;
    let mut t = f + 1;
    while t < to {
        if s.compare(t, val) == Ordering::Greater {
            return upper(s, f, t, val);
        }
        let delta = t - f;
        f = t;
        t += delta << 1;
    }
    upper(s, f, to, val)
}

/// Merges the sorted runs `[from, mid)` and `[mid, to)` without scratch space.
pub fn merge_in_place<S: Sortable + ?Sized>(s: &mut S, from: usize, mid: usize, to: usize) {
    merge_in_place_with(s, from, mid, to, rotate::<S>);
}

/// [`merge_in_place`] with a custom rotation, so sorters owning scratch
/// space can rotate through it.
pub(crate) fn merge_in_place_with<S, R>(s: &mut S, mut from: usize, mid: usize, mut to: usize, rotate: R)
where
    S: Sortable + ?Sized,
    R: Fn(&mut S, usize, usize, usize) + Copy,
{
    if from == mid || mid == to || s.compare(mid - 1, mid) != Ordering::Greater {
        return;
    } else if to - from == 2 {
        s.swap(mid - 1, mid);
        return;
    }
    while s.compare(from, mid) != Ordering::Greater {
        from += 1;
    }
    while s.compare(mid - 1, to - 1) != Ordering::Greater {
        to -= 1;
    }
    let (first_cut, second_cut, len22);
    if mid - from > to - mid {
        first_cut = from + ((mid - from) >> 1);
        second_cut = lower(s, mid, to, first_cut);
        len22 = second_cut - mid;
    } else {
        len22 = (to - mid) >> 1;
        second_cut = mid + len22;
        first_cut = upper(s, from, mid, second_cut);
    }
    rotate(s, first_cut, mid, second_cut);
    let new_mid = first_cut + len22;
    merge_in_place_with(s, from, first_cut, new_mid, rotate);
    merge_in_place_with(s, new_mid, second_cut, to, rotate);
}

/// Stable merge sort that merges in place: no scratch, `O(n log² n)` swaps.
#[derive(Clone, Copy, Debug, Default)]
pub struct InPlaceMergeSorter;

impl InPlaceMergeSorter {
    /// Creates the sorter.
    pub fn new() -> Self {
        Self
    }

    /// Sorts `[from, to)`.
    pub fn sort<S: Sortable + ?Sized>(&self, s: &mut S, from: usize, to: usize) -> Result<()> {
        check_range(from, to)?;
        merge_sort(s, from, to);
        Ok(())
    }
}

fn merge_sort<S: Sortable + ?Sized>(s: &mut S, from: usize, to: usize) {
    if to - from < BINARY_SORT_THRESHOLD {
        binary_sort(s, from, to);
    } else {
        let mid = from + ((to - from) >> 1);
        merge_sort(s, from, mid);
        merge_sort(s, mid, to);
        merge_in_place(s, from, mid, to);
    }
}
