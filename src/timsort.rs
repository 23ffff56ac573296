//! Stable adaptive merge sort.
//!
//! Detects natural runs, extends short ones to a minimum length with binary
//! insertion sort and merges them while keeping the run stack balanced.
//! Merges gallop once one side keeps winning. Merges whose shorter side fits
//! in `max_temp_slots` go through temporary storage; larger ones fall back
//! to an in-place merge, so scratch space never exceeds `max_temp_slots`.

use crate::core::MergeSortable;
use crate::error::{Result, check_range};
use crate::sorter::{binary_sort_from, lower2, merge_in_place_with, reverse, upper2};
use std::cmp::Ordering;

const MIN_RUN: usize = 32;
const THRESHOLD: usize = 64;
const MIN_GALLOP: usize = 7;

/// Stable sort over a [`MergeSortable`].
#[derive(Clone, Copy, Debug)]
pub struct TimSorter {
    max_temp_slots: usize,
}

impl TimSorter {
    /// Creates a sorter that saves at most `max_temp_slots` entries at a time.
    pub fn new(max_temp_slots: usize) -> Self {
        Self { max_temp_slots }
    }

    /// Maximum number of entries held in temporary storage.
    pub fn max_temp_slots(&self) -> usize {
        self.max_temp_slots
    }

    /// Sorts `[from, to)`, keeping equal entries in their original order.
    pub fn sort<S: MergeSortable + ?Sized>(&self, s: &mut S, from: usize, to: usize) -> Result<()> {
        check_range(from, to)?;
        self.sort_range(s, from, to);
        Ok(())
    }

    pub(crate) fn sort_range<S: MergeSortable + ?Sized>(&self, s: &mut S, from: usize, to: usize) {
        if to - from > 1 {
            Runs::new(s, self.max_temp_slots, from, to).sort();
        }
    }
}

fn min_run(length: usize) -> usize {
    debug_assert!(length >= MIN_RUN);
    let mut n = length;
    let mut r = 0;
    while n >= 64 {
        r |= n & 1;
        n >>= 1;
    }
    n + r
}

/// Per-call merge state: the run stack over one range.
struct Runs<'a, S: MergeSortable + ?Sized> {
    s: &'a mut S,
    max_temp_slots: usize,
    min_run: usize,
    to: usize,
    /// `run_ends[0]` is the range start; `run_ends[i]` the end of the i-th pushed run.
    run_ends: Vec<usize>,
}

impl<'a, S: MergeSortable + ?Sized> Runs<'a, S> {
    fn new(s: &'a mut S, max_temp_slots: usize, from: usize, to: usize) -> Self {
        let length = to - from;
        Self {
            s,
            max_temp_slots,
            min_run: if length <= THRESHOLD { length } else { min_run(length) },
            to,
            run_ends: vec![from],
        }
    }

    #[inline]
    fn stack_size(&self) -> usize {
        self.run_ends.len() - 1
    }

    #[inline]
    fn run_len(&self, i: usize) -> usize {
        let off = self.stack_size() - i;
        self.run_ends[off] - self.run_ends[off - 1]
    }

    #[inline]
    fn run_base(&self, i: usize) -> usize {
        self.run_ends[self.stack_size() - i - 1]
    }

    #[inline]
    fn run_end(&self, i: usize) -> usize {
        self.run_ends[self.stack_size() - i]
    }

    fn sort(mut self) {
        loop {
            self.ensure_invariants();
            let len = self.next_run();
            let end = self.run_end(0) + len;
            self.run_ends.push(end);
            if end >= self.to {
                break;
            }
        }
        while self.stack_size() > 1 {
            self.merge_at(0);
        }
        debug_assert_eq!(self.run_end(0), self.to);
    }

    /// Makes the next run sorted and returns its length.
    fn next_run(&mut self) -> usize {
        let run_base = self.run_end(0);
        debug_assert!(run_base < self.to);
        if run_base == self.to - 1 {
            return 1;
        }
        let to = self.to;
        let mut o = run_base + 2;
        if self.s.compare(run_base, run_base + 1) == Ordering::Greater {
            // strictly descending, so reversing keeps stability
            while o < to && self.s.compare(o - 1, o) == Ordering::Greater {
                o += 1;
            }
            reverse(&mut *self.s, run_base, o);
        } else {
            while o < to && self.s.compare(o - 1, o) != Ordering::Greater {
                o += 1;
            }
        }
        let run_hi = o.max(to.min(run_base + self.min_run));
        binary_sort_from(&mut *self.s, run_base, run_hi, o);
        run_hi - run_base
    }

    fn ensure_invariants(&mut self) {
        while self.stack_size() > 1 {
            let run_len0 = self.run_len(0);
            let run_len1 = self.run_len(1);
            if self.stack_size() > 2 {
                let run_len2 = self.run_len(2);
                if run_len2 <= run_len1 + run_len0 {
                    // merge the smaller of 0 and 2 with 1
                    if run_len2 < run_len0 {
                        self.merge_at(1);
                    } else {
                        self.merge_at(0);
                    }
                    continue;
                }
            }
            if run_len1 <= run_len0 {
                self.merge_at(0);
                continue;
            }
            break;
        }
    }

    /// Merges runs `n + 1` and `n`.
    fn merge_at(&mut self, n: usize) {
        debug_assert!(self.stack_size() >= 2);
        let (lo, mid, hi) = (self.run_base(n + 1), self.run_base(n), self.run_end(n));
        self.merge(lo, mid, hi);
        let boundary = self.stack_size() - n - 1;
        self.run_ends.remove(boundary);
    }

    fn merge(&mut self, lo: usize, mid: usize, hi: usize) {
        if self.s.compare(mid - 1, mid) != Ordering::Greater {
            return;
        }
        let lo = upper2(&mut *self.s, lo, mid, mid);
        let hi = lower2(&mut *self.s, mid, hi, mid - 1);

        if hi - mid <= mid - lo && hi - mid <= self.max_temp_slots {
            self.merge_hi(lo, mid, hi);
        } else if mid - lo <= self.max_temp_slots {
            self.merge_lo(lo, mid, hi);
        } else {
            let max = self.max_temp_slots;
            merge_in_place_with(&mut *self.s, lo, mid, hi, move |s: &mut S, lo, mid, hi| {
                rotate(s, max, lo, mid, hi)
            });
        }
    }

    fn merge_lo(&mut self, lo: usize, mid: usize, hi: usize) {
        debug_assert_eq!(self.s.compare(lo, mid), Ordering::Greater);
        let s = &mut *self.s;
        let len1 = mid - lo;
        s.save(lo, len1);
        s.copy(mid, lo);
        let (mut i, mut j, mut dest) = (0, mid + 1, lo + 1);
        'outer: loop {
            let mut count = 0;
            while count < MIN_GALLOP {
                if i >= len1 || j >= hi {
                    break 'outer;
                } else if s.compare_saved(i, j) != Ordering::Greater {
                    s.restore(i, dest);
                    i += 1;
                    count = 0;
                } else {
                    s.copy(j, dest);
                    j += 1;
                    count += 1;
                }
                dest += 1;
            }
            // gallop
            let next = lower_saved3(s, j, hi, i);
            while j < next {
                s.copy(j, dest);
                j += 1;
                dest += 1;
            }
            s.restore(i, dest);
            i += 1;
            dest += 1;
        }
        while i < len1 {
            s.restore(i, dest);
            i += 1;
            dest += 1;
        }
        debug_assert_eq!(j, dest);
    }

    fn merge_hi(&mut self, lo: usize, mid: usize, hi: usize) {
        debug_assert_eq!(self.s.compare(mid - 1, hi - 1), Ordering::Greater);
        let s = &mut *self.s;
        let len2 = hi - mid;
        s.save(mid, len2);
        s.copy(mid - 1, hi - 1);
        // cursors run down past lo and 0, hence signed
        let lo = lo as isize;
        let (mut i, mut j, mut dest) = (mid as isize - 2, len2 as isize - 1, hi as isize - 2);
        'outer: loop {
            let mut count = 0;
            while count < MIN_GALLOP {
                if i < lo || j < 0 {
                    break 'outer;
                } else if s.compare_saved(j as usize, i as usize) != Ordering::Less {
                    s.restore(j as usize, dest as usize);
                    j -= 1;
                    count = 0;
                } else {
                    s.copy(i as usize, dest as usize);
                    i -= 1;
                    count += 1;
                }
                dest -= 1;
            }
            // gallop
            let next = upper_saved3(s, lo as usize, (i + 1) as usize, j as usize) as isize;
            while i >= next {
                s.copy(i as usize, dest as usize);
                i -= 1;
                dest -= 1;
            }
            s.restore(j as usize, dest as usize);
            j -= 1;
            dest -= 1;
        }
        while j >= 0 {
            s.restore(j as usize, dest as usize);
            j -= 1;
            dest -= 1;
        }
        debug_assert_eq!(i, dest);
    }
}

/// Rotation through temporary storage when the shorter side fits.
fn rotate<S: MergeSortable + ?Sized>(s: &mut S, max_temp_slots: usize, mut lo: usize, mut mid: usize, hi: usize) {
    if lo == mid || mid == hi {
        return;
    }
    let len1 = mid - lo;
    let len2 = hi - mid;
    if len1 == len2 {
        while mid < hi {
            s.swap(lo, mid);
            lo += 1;
            mid += 1;
        }
    } else if len2 < len1 && len2 <= max_temp_slots {
        s.save(mid, len2);
        for (i, j) in (lo..mid).rev().zip((lo + len2..hi).rev()) {
            s.copy(i, j);
        }
        for i in 0..len2 {
            s.restore(i, lo + i);
        }
    } else if len1 <= max_temp_slots {
        s.save(lo, len1);
        for (i, j) in (mid..hi).zip(lo..) {
            s.copy(i, j);
        }
        for i in 0..len1 {
            s.restore(i, lo + len2 + i);
        }
    } else {
        reverse(s, lo, mid);
        reverse(s, mid, hi);
        reverse(s, lo, hi);
    }
}

/// First slot in `[from, to)` not less than saved entry `val`.
fn lower_saved<S: MergeSortable + ?Sized>(s: &mut S, mut from: usize, to: usize, val: usize) -> usize {
    let mut len = to - from;
    while len > 0 {
        let half = len >> 1;
        let mid = from + half;
        if s.compare_saved(val, mid) == Ordering::Greater {
            from = mid + 1;
            len = len - half - 1;
        } else {
            len = half;
        }
    }
    from
}

/// First slot in `[from, to)` greater than saved entry `val`.
fn upper_saved<S: MergeSortable + ?Sized>(s: &mut S, mut from: usize, to: usize, val: usize) -> usize {
    let mut len = to - from;
    while len > 0 {
        let half = len >> 1;
        let mid = from + half;
        if s.compare_saved(val, mid) == Ordering::Less {
            len = half;
        } else {
            from = mid + 1;
            len = len - half - 1;
        }
    }
    from
}

// faster than lower_saved when the answer is close to `from`
fn lower_saved3<S: MergeSortable + ?Sized>(s: &mut S, from: usize, to: usize, val: usize) -> usize {
    let mut f = from;
    let mut t = f + 1;
    while t < to {
        if s.compare_saved(val, t) != Ordering::Greater {
            return lower_saved(s, f, t, val);
        }
        let delta = t - f;
        f = t;
        t += delta << 1;
    }
    lower_saved(s, f, to, val)
}

// faster than upper_saved when the answer is close to `to`
fn upper_saved3<S: MergeSortable + ?Sized>(s: &mut S, from: usize, to: usize, val: usize) -> usize {
    let mut f = to as isize - 1;
    let mut t = to;
    while f > from as isize {
        if s.compare_saved(val, f as usize) != Ordering::Less {
            return upper_saved(s, f as usize, t, val);
        }
        let delta = t - f as usize;
        t = f as usize;
        f -= (delta << 1) as isize;
    }
    upper_saved(s, from, t, val)
}
