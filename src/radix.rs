//! Most-significant-byte radix sort and radix select.
//!
//! Both partition on one byte position at a time into 257 buckets: bucket 0
//! holds sequences that ended before the position, bucket `b + 1` those with
//! byte `b`. The longest common prefix of a range is computed in the same
//! pass as the histogram, so a range whose entries all share the next bytes
//! skips straight past them.
//!
//! Small ranges and deep recursion go to the comparison fallback of the
//! [`ByteAt`] implementation: bucket bookkeeping dominates on tiny ranges, and
//! long shared prefixes make repeated histogram passes cache-unfriendly.

use crate::config::RadixConfig;
use crate::core::ByteAt;
use crate::error::{Result, check_range, check_rank};
use cuneiform::cuneiform;
use tracing::trace;

/// One bucket per byte value plus one for "sequence ended".
const HISTOGRAM_SIZE: usize = 257;

/// Longest common prefix looked at in a single histogram pass.
const COMMON_PREFIX_WINDOW: usize = 24;

// Cache-aligned bucket counts.
#[cuneiform]
struct Histogram {
    counts: [usize; HISTOGRAM_SIZE],
}

impl Histogram {
    fn new() -> Self {
        Self {
            counts: [0; HISTOGRAM_SIZE],
        }
    }
}

#[inline(always)]
fn bucket(b: Option<u8>) -> usize {
    b.map_or(0, |b| b as usize + 1)
}

#[inline(always)]
fn get_bucket<T: ByteAt + ?Sized>(keys: &mut T, i: usize, k: usize) -> usize {
    bucket(keys.byte_at(i, k))
}

/// Computes the common prefix length of `[from, to)` starting at byte `k` and,
/// when it is zero, the byte-`k` histogram of the range.
///
/// A non-zero common prefix means every entry falls in the bucket of the first
/// prefix byte; that bucket alone is filled in.
fn common_prefix_and_histogram<T: ByteAt + ?Sized>(
    keys: &mut T,
    common_prefix: &mut [Option<u8>],
    histogram: &mut [usize; HISTOGRAM_SIZE],
    from: usize,
    to: usize,
    k: usize,
    max_length: usize,
) -> usize {
    let mut prefix_len = common_prefix.len().min(max_length - k);
    for j in 0..prefix_len {
        let b = keys.byte_at(from, k + j);
        common_prefix[j] = b;
        if b.is_none() {
            prefix_len = j + 1;
            break;
        }
    }

    let mut i = from + 1;
    'outer: while i < to {
        for j in 0..prefix_len {
            let b = keys.byte_at(i, k + j);
            if b != common_prefix[j] {
                prefix_len = j;
                if prefix_len == 0 {
                    // no common prefix: entries so far all went to the first bucket
                    histogram[bucket(common_prefix[0])] = i - from;
                    histogram[bucket(b)] = 1;
                    break 'outer;
                }
                break;
            }
        }
        i += 1;
    }

    if i < to {
        debug_assert_eq!(prefix_len, 0);
        for idx in i + 1..to {
            histogram[get_bucket(keys, idx, k)] += 1;
        }
    } else {
        debug_assert!(prefix_len > 0);
        histogram[bucket(common_prefix[0])] = to - from;
    }
    prefix_len
}

/// Checks that a single non-empty bucket goes with a non-zero common prefix.
fn histogram_is_consistent(prefix_len: usize, histogram: &[usize; HISTOGRAM_SIZE]) -> bool {
    let unique = histogram.iter().filter(|&&c| c > 0).count();
    if unique == 1 {
        prefix_len >= 1
    } else {
        prefix_len == 0
    }
}

/// Unstable MSB radix sort over a [`ByteAt`] collection.
///
/// Holds one histogram per recursion level, reused across calls.
pub struct MsbRadixSorter {
    config: RadixConfig,
    histograms: Vec<Histogram>,
    end_offsets: [usize; HISTOGRAM_SIZE],
    common_prefix: Vec<Option<u8>>,
}

impl Default for MsbRadixSorter {
    fn default() -> Self {
        Self::new(RadixConfig::default())
    }
}

impl MsbRadixSorter {
    /// Creates a sorter with the given thresholds.
    pub fn new(config: RadixConfig) -> Self {
        Self {
            common_prefix: vec![None; COMMON_PREFIX_WINDOW.min(config.max_length)],
            config,
            histograms: Vec::new(),
            end_offsets: [0; HISTOGRAM_SIZE],
        }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &RadixConfig {
        &self.config
    }

    /// Sorts `[from, to)` in unsigned lexicographic order of the byte sequences.
    pub fn sort<T: ByteAt + ?Sized>(&mut self, keys: &mut T, from: usize, to: usize) -> Result<()> {
        check_range(from, to)?;
        self.sort_range(keys, from, to);
        Ok(())
    }

    pub(crate) fn sort_range<T: ByteAt + ?Sized>(&mut self, keys: &mut T, from: usize, to: usize) {
        if self.config.max_length == 0 {
            // nothing to order on
            return;
        }
        self.sort_level(keys, from, to, 0, 0);
    }

    fn sort_level<T: ByteAt + ?Sized>(&mut self, keys: &mut T, from: usize, to: usize, k: usize, level: usize) {
        if to - from <= self.config.length_threshold || level >= self.config.level_threshold {
            trace!(from, to, k, level, "radix sort fallback");
            keys.fallback_sort(from, to, k, self.config.max_length);
        } else {
            self.radix_sort(keys, from, to, k, level);
        }
    }

    fn radix_sort<T: ByteAt + ?Sized>(&mut self, keys: &mut T, from: usize, to: usize, mut k: usize, level: usize) {
        while self.histograms.len() <= level {
            self.histograms.push(Histogram::new());
        }
        let max_length = self.config.max_length;

        loop {
            let histogram = &mut self.histograms[level].counts;
            histogram.fill(0);
            let prefix_len = common_prefix_and_histogram(
                keys,
                &mut self.common_prefix,
                histogram,
                from,
                to,
                k,
                max_length,
            );
            if prefix_len > 0 {
                // stop if bytes run out or every entry ended inside the prefix
                if k + prefix_len < max_length && histogram[0] < to - from {
                    k += prefix_len;
                    continue;
                }
                return;
            }
            debug_assert!(histogram_is_consistent(prefix_len, histogram));
            break;
        }

        let histogram = &mut self.histograms[level].counts;
        sum_histogram(histogram, &mut self.end_offsets);
        reorder(keys, from, histogram, &self.end_offsets, k);
        // reorder advanced every start offset to its bucket end

        if k + 1 < max_length {
            // bucket 0 holds sequences that already ended: nothing left to compare
            let mut prev = self.histograms[level].counts[0];
            for i in 1..HISTOGRAM_SIZE {
                let h = self.histograms[level].counts[i];
                if h - prev > 1 {
                    self.sort_level(keys, from + prev, from + h, k + 1, level + 1);
                }
                prev = h;
            }
        }
    }
}

/// Turns counts into start offsets and records matching end offsets.
fn sum_histogram(histogram: &mut [usize; HISTOGRAM_SIZE], end_offsets: &mut [usize; HISTOGRAM_SIZE]) {
    let mut accum = 0;
    for (count, end) in histogram.iter_mut().zip(end_offsets.iter_mut()) {
        let c = *count;
        *count = accum;
        accum += c;
        *end = accum;
    }
}

/// Moves every entry into its bucket in place, like the Dutch flag problem.
fn reorder<T: ByteAt + ?Sized>(
    keys: &mut T,
    from: usize,
    start_offsets: &mut [usize; HISTOGRAM_SIZE],
    end_offsets: &[usize; HISTOGRAM_SIZE],
    k: usize,
) {
    for i in 0..HISTOGRAM_SIZE {
        let limit = end_offsets[i];
        let mut h1 = start_offsets[i];
        while h1 < limit {
            let b = get_bucket(keys, from + h1, k);
            let h2 = start_offsets[b];
            start_offsets[b] += 1;
            keys.swap(from + h1, from + h2);
            h1 = start_offsets[i];
        }
    }
}

/// Expected linear-time k-th order statistic over a [`ByteAt`] collection.
pub struct RadixSelector {
    config: RadixConfig,
    histogram: Histogram,
    common_prefix: Vec<Option<u8>>,
}

impl Default for RadixSelector {
    fn default() -> Self {
        Self::new(RadixConfig::default())
    }
}

impl RadixSelector {
    /// Creates a selector with the given thresholds.
    pub fn new(config: RadixConfig) -> Self {
        Self {
            common_prefix: vec![None; COMMON_PREFIX_WINDOW.min(config.max_length)],
            config,
            histogram: Histogram::new(),
        }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &RadixConfig {
        &self.config
    }

    /// Reorders `[from, to)` so that slot `k` holds the k-th smallest sequence,
    /// with no greater sequence before it and no lesser one after it.
    pub fn select<T: ByteAt + ?Sized>(&mut self, keys: &mut T, from: usize, to: usize, k: usize) -> Result<()> {
        check_rank(from, to, k)?;
        if self.config.max_length == 0 {
            return Ok(());
        }
        self.select_level(keys, from, to, k, 0, 0);
        Ok(())
    }

    fn select_level<T: ByteAt + ?Sized>(
        &mut self,
        keys: &mut T,
        mut from: usize,
        mut to: usize,
        k: usize,
        mut d: usize,
        mut level: usize,
    ) {
        let max_length = self.config.max_length;
        loop {
            if to - from <= self.config.length_threshold || level >= self.config.level_threshold {
                trace!(from, to, d, level, "radix select fallback");
                keys.fallback_select(from, to, k, d, max_length);
                return;
            }

            let histogram = &mut self.histogram.counts;
            histogram.fill(0);
            let prefix_len = common_prefix_and_histogram(
                keys,
                &mut self.common_prefix,
                histogram,
                from,
                to,
                d,
                max_length,
            );
            if prefix_len > 0 {
                if d + prefix_len < max_length && histogram[0] < to - from {
                    d += prefix_len;
                    continue;
                }
                return;
            }
            debug_assert!(histogram_is_consistent(prefix_len, histogram));

            let mut bucket_from = from;
            let mut target = None;
            for b in 0..HISTOGRAM_SIZE {
                let bucket_to = bucket_from + histogram[b];
                if bucket_to > k {
                    target = Some((b, bucket_from, bucket_to));
                    break;
                }
                bucket_from = bucket_to;
            }
            debug_assert!(target.is_some(), "rank {k} lies outside of [{from}, {to})");
            let Some((b, bucket_from, bucket_to)) = target else {
                return;
            };

            partition(keys, from, to, b, bucket_from, bucket_to, d);
            // bucket 0 entries are all equal, so only other buckets need another pass
            if b == 0 || d + 1 >= max_length {
                return;
            }
            from = bucket_from;
            to = bucket_to;
            d += 1;
            level += 1;
        }
    }
}

/// Moves the entries of `bucket` to `[bucket_from, bucket_to)`, lesser buckets
/// before and greater buckets after.
fn partition<T: ByteAt + ?Sized>(
    keys: &mut T,
    from: usize,
    to: usize,
    bucket: usize,
    bucket_from: usize,
    bucket_to: usize,
    d: usize,
) {
    let mut left = from;
    let mut right = to - 1;
    let mut slot = bucket_from;

    loop {
        let mut left_bucket = get_bucket(keys, left, d);
        let mut right_bucket = get_bucket(keys, right, d);

        while left_bucket <= bucket && left < bucket_from {
            if left_bucket == bucket {
                keys.swap(left, slot);
                slot += 1;
            } else {
                left += 1;
            }
            left_bucket = get_bucket(keys, left, d);
        }

        while right_bucket >= bucket && right >= bucket_to {
            if right_bucket == bucket {
                keys.swap(right, slot);
                slot += 1;
            } else {
                right -= 1;
            }
            right_bucket = get_bucket(keys, right, d);
        }

        if left < bucket_from && right >= bucket_to {
            keys.swap(left, right);
            left += 1;
            right -= 1;
        } else {
            debug_assert_eq!(left, bucket_from);
            debug_assert_eq!(right, bucket_to - 1);
            break;
        }
    }
}
