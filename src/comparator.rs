//! Byte-sequence orderings for the comparison-based front doors.

use std::cmp::Ordering;

/// Total order over byte sequences.
pub trait BytesComparator {
    /// Compares `a` with `b`.
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

impl<C: BytesComparator + ?Sized> BytesComparator for &C {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        (**self).compare(a, b)
    }
}

/// Unsigned lexicographic order; a proper prefix sorts first.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unsigned;

impl BytesComparator for Unsigned {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// Order over keys that are all `N` bytes long, such as big-endian encoded
/// integers.
///
/// Widths of 4 and 8 compare as a single machine word. Only the first `N`
/// bytes of each key take part; shorter keys compare by their available prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedWidth<const N: usize>;

impl<const N: usize> BytesComparator for FixedWidth<N> {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        if a.len() >= N && b.len() >= N {
            match N {
                4 => return be_u32(a).cmp(&be_u32(b)),
                8 => return be_u64(a).cmp(&be_u64(b)),
                _ => {}
            }
        }
        a[..a.len().min(N)].cmp(&b[..b.len().min(N)])
    }
}

#[inline(always)]
fn be_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    u32::from_be_bytes(word)
}

#[inline(always)]
fn be_u64(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(word)
}
