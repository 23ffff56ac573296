//! Hash index mapping byte terms to dense ids.
//!
//! Terms are stored once in a [`ByteBlockPool`], each behind a 1-byte
//! (length < 128) or 2-byte big-endian (high bit set) length prefix, and never
//! straddle a block, so [`BytesRefHash::get`] borrows straight from the pool.
//! The bucket table uses open addressing: on a collision the hash code itself
//! is incremented and re-masked.
//!
//! [`BytesRefHash::compact`] and [`BytesRefHash::sort`] reorder the bucket
//! table in place and hand back a read-only [`TermIds`] view. Adding is
//! rejected with [`Error::Finalized`] until the hash is cleared.

use crate::allocator::{BlockAllocator, DirectAllocator};
use crate::config::{HashConfig, MAX_HASH_SIZE};
use crate::core::ByteAt;
use crate::counter::Counter;
use crate::error::{Error, Result};
use crate::murmur::murmurhash3_x86_32;
use crate::pool::{BLOCK_MASK, BLOCK_SHIFT, BLOCK_SIZE, ByteBlockPool};
use crate::radix::MsbRadixSorter;
use tracing::debug;

/// Longest term that fits in a block together with its length prefix.
pub const MAX_TERM_LENGTH: usize = BLOCK_SIZE - 2;

const EMPTY: i32 = -1;
const ID_BYTES: i64 = std::mem::size_of::<i32>() as i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Active,
    Finalized,
    Closed,
}

/// Reads the length-prefixed term starting at absolute offset `start`.
#[inline]
fn term_at<A: BlockAllocator>(pool: &ByteBlockPool<A>, start: usize) -> &[u8] {
    let block = pool.block(start >> BLOCK_SHIFT);
    let pos = start & BLOCK_MASK;
    let (len, header) = if block[pos] & 0x80 == 0 {
        (block[pos] as usize, 1)
    } else {
        ((((block[pos] & 0x7f) as usize) << 8) | block[pos + 1] as usize, 2)
    };
    &block[pos + header..pos + header + len]
}

/// Interns byte terms, assigning ids `0, 1, 2, ...` in insertion order.
///
/// # Examples
///
/// ```
/// use termpool::hash::BytesRefHash;
/// use termpool::pool::ByteBlockPool;
///
/// let mut hash = BytesRefHash::new(ByteBlockPool::default());
/// assert_eq!(hash.add(b"banana").unwrap(), 0);
/// assert_eq!(hash.add(b"apple").unwrap(), 1);
/// assert_eq!(hash.add(b"apple").unwrap(), -2);
/// assert_eq!(hash.get(1), b"apple");
///
/// let sorted = hash.sort().unwrap();
/// assert_eq!(sorted.ids(), &[1, 0]);
/// ```
pub struct BytesRefHash<A: BlockAllocator = DirectAllocator> {
    pool: ByteBlockPool<A>,
    /// Bucket table; `EMPTY` or an id. Compacted to a dense prefix when finalized.
    ids: Vec<i32>,
    /// Absolute pool offset of each id's record, indexed by id.
    bytes_start: Vec<usize>,
    count: usize,
    hash_size: usize,
    hash_half_size: usize,
    hash_mask: usize,
    seed: u32,
    bytes_used: Counter,
    state: State,
    radix: MsbRadixSorter,
}

impl<A: BlockAllocator> BytesRefHash<A> {
    /// Creates a hash with the default configuration over `pool`.
    pub fn new(pool: ByteBlockPool<A>) -> Self {
        Self::with_config(pool, HashConfig::default(), Counter::new())
    }

    /// Creates a hash over `pool`, reporting the bucket table size to `bytes_used`.
    pub fn with_config(pool: ByteBlockPool<A>, config: HashConfig, bytes_used: Counter) -> Self {
        let hash_size = config.table_size();
        bytes_used.add_and_get(hash_size as i64 * ID_BYTES);
        Self {
            pool,
            ids: vec![EMPTY; hash_size],
            bytes_start: Vec::new(),
            count: 0,
            hash_size,
            hash_half_size: hash_size / 2,
            hash_mask: hash_size - 1,
            seed: config.resolved_seed(),
            bytes_used,
            state: State::Active,
            radix: MsbRadixSorter::default(),
        }
    }

    /// Number of distinct terms.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no term was added since the last clear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current number of buckets.
    #[inline]
    pub fn table_size(&self) -> usize {
        self.hash_size
    }

    /// The pool holding the term bytes.
    pub fn pool(&self) -> &ByteBlockPool<A> {
        &self.pool
    }

    /// Mutable access to the pool, for callers that share it with other writers.
    pub fn pool_mut(&mut self) -> &mut ByteBlockPool<A> {
        &mut self.pool
    }

    /// The counter the bucket table reports into.
    pub fn bytes_used(&self) -> &Counter {
        &self.bytes_used
    }

    fn check_active(&self) -> Result<()> {
        match self.state {
            State::Active => Ok(()),
            State::Finalized => Err(Error::Finalized),
            State::Closed => Err(Error::Closed),
        }
    }

    #[inline]
    fn hash(&self, bytes: &[u8]) -> u32 {
        murmurhash3_x86_32(bytes, self.seed)
    }

    /// Walks the probe sequence of `code` until an empty bucket or one whose id
    /// satisfies `is_match`, and returns that bucket.
    fn probe(&self, mut code: u32, is_match: impl Fn(usize) -> bool) -> usize {
        let mut pos = code as usize & self.hash_mask;
        loop {
            let e = self.ids[pos];
            if e == EMPTY || is_match(e as usize) {
                return pos;
            }
            code = code.wrapping_add(1);
            pos = code as usize & self.hash_mask;
        }
    }

    fn find_bucket(&self, bytes: &[u8]) -> usize {
        self.probe(self.hash(bytes), |e| {
            term_at(&self.pool, self.bytes_start[e]) == bytes
        })
    }

    /// Makes room for one more id: reserves its `bytes_start` slot and, when
    /// the insert will reach the grow threshold, checks the grown table size.
    ///
    /// Runs before anything is written so a failure leaves the hash untouched.
    fn reserve_one(&mut self) -> Result<()> {
        self.bytes_start
            .try_reserve(1)
            .map_err(|_| Error::ArrayTooLarge {
                requested: self.count + 1,
            })?;
        if self.count + 1 == self.hash_half_size {
            self.hash_size
                .checked_mul(2)
                .filter(|&size| size <= MAX_HASH_SIZE)
                .ok_or(Error::Overflow { what: "hash table" })?;
        }
        if self.count >= i32::MAX as usize {
            return Err(Error::Overflow { what: "term ids" });
        }
        Ok(())
    }

    /// Adds `bytes`.
    ///
    /// Returns the new id, or `-(id + 1)` if the term was already present.
    ///
    /// # Errors
    ///
    /// [`Error::TermTooLong`] if `bytes` is longer than [`MAX_TERM_LENGTH`];
    /// capacity errors if a table cannot grow; [`Error::Finalized`] or
    /// [`Error::Closed`] if the hash is not accepting terms. Nothing is
    /// written on error.
    pub fn add(&mut self, bytes: &[u8]) -> Result<i32> {
        self.check_active()?;
        let pos = self.find_bucket(bytes);
        let e = self.ids[pos];
        if e != EMPTY {
            return Ok(-(e + 1));
        }

        let length = bytes.len();
        if length > MAX_TERM_LENGTH {
            return Err(Error::TermTooLong {
                length,
                max: MAX_TERM_LENGTH,
            });
        }
        self.reserve_one()?;

        if length + 2 + self.pool.byte_upto() > BLOCK_SIZE {
            self.pool.next_buffer()?;
        }
        let start = self.pool.position();
        if length < 0x80 {
            self.pool.append(&[length as u8])?;
        } else {
            self.pool.append(&((length as u16) | 0x8000).to_be_bytes())?;
        }
        self.pool.append(bytes)?;

        Ok(self.insert(pos, start, true))
    }

    /// Adds an id keyed by a raw pool offset instead of by term content.
    ///
    /// Two calls with the same `offset` get the same id. Nothing is written
    /// to the pool. [`get`](Self::get) and [`sort`](Self::sort) read the record
    /// at `offset` from this hash's own pool, so they only work if the caller
    /// wrote it there through [`pool_mut`](Self::pool_mut) in the stored-term
    /// format: a 1-byte length (< 128) or a 2-byte big-endian length with the
    /// high bit set, followed by the bytes, all inside one block. Otherwise
    /// use the ids with [`byte_start`](Self::byte_start) only, and do not mix
    /// this with [`add`](Self::add) on the same hash.
    pub fn add_by_pool_offset(&mut self, offset: usize) -> Result<i32> {
        self.check_active()?;
        let pos = self.probe(offset as u32, |e| self.bytes_start[e] == offset);
        let e = self.ids[pos];
        if e != EMPTY {
            return Ok(-(e + 1));
        }
        self.reserve_one()?;
        Ok(self.insert(pos, offset, false))
    }

    fn insert(&mut self, pos: usize, start: usize, hash_on_data: bool) -> i32 {
        let e = self.count as i32;
        self.bytes_start.push(start);
        self.count += 1;
        self.ids[pos] = e;
        if self.count == self.hash_half_size {
            self.rehash(self.hash_size * 2, hash_on_data);
        }
        e
    }

    /// Looks up `bytes` without adding it.
    ///
    /// Returns `None` when the term is absent or the hash is finalized or closed.
    pub fn find(&self, bytes: &[u8]) -> Option<i32> {
        if self.state != State::Active {
            return None;
        }
        match self.ids[self.find_bucket(bytes)] {
            EMPTY => None,
            e => Some(e),
        }
    }

    /// Returns the bytes of term `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is negative or not less than [`len`](Self::len).
    pub fn get(&self, id: i32) -> &[u8] {
        assert!(
            id >= 0 && (id as usize) < self.count,
            "id {id} out of range for {} terms",
            self.count
        );
        term_at(&self.pool, self.bytes_start[id as usize])
    }

    /// Absolute pool offset of the record for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is negative or not less than [`len`](Self::len).
    pub fn byte_start(&self, id: i32) -> usize {
        assert!(
            id >= 0 && (id as usize) < self.count,
            "id {id} out of range for {} terms",
            self.count
        );
        self.bytes_start[id as usize]
    }

    fn rehash(&mut self, new_size: usize, hash_on_data: bool) {
        let new_mask = new_size - 1;
        self.bytes_used.add_and_get(new_size as i64 * ID_BYTES);
        let mut new_ids = vec![EMPTY; new_size];
        for &e in self.ids.iter().filter(|&&e| e != EMPTY) {
            let start = self.bytes_start[e as usize];
            let mut code = if hash_on_data {
                murmurhash3_x86_32(term_at(&self.pool, start), self.seed)
            } else {
                start as u32
            };
            let mut pos = code as usize & new_mask;
            while new_ids[pos] != EMPTY {
                code = code.wrapping_add(1);
                pos = code as usize & new_mask;
            }
            new_ids[pos] = e;
        }
        self.bytes_used.add_and_get(-(self.ids.len() as i64) * ID_BYTES);
        debug!(
            old_size = self.hash_size,
            new_size,
            count = self.count,
            "term hash rehashed"
        );
        self.ids = new_ids;
        self.hash_size = new_size;
        self.hash_half_size = new_size / 2;
        self.hash_mask = new_mask;
    }

    fn compact_ids(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Err(Error::Closed);
        }
        let mut upto = 0;
        for i in 0..self.hash_size {
            if self.ids[i] != EMPTY {
                if upto < i {
                    self.ids[upto] = self.ids[i];
                    self.ids[i] = EMPTY;
                }
                upto += 1;
            }
        }
        debug_assert_eq!(upto, self.count);
        self.state = State::Finalized;
        Ok(())
    }

    /// Moves all ids to the front of the bucket table, in no particular order.
    ///
    /// Further adds fail with [`Error::Finalized`] until [`clear`](Self::clear).
    pub fn compact(&mut self) -> Result<TermIds<'_, A>> {
        self.compact_ids()?;
        Ok(TermIds { hash: self })
    }

    /// Compacts the ids and orders them by the unsigned lexicographic order of
    /// their terms. Equal terms cannot occur, so the order is total.
    ///
    /// Further adds fail with [`Error::Finalized`] until [`clear`](Self::clear).
    pub fn sort(&mut self) -> Result<TermIds<'_, A>> {
        self.compact_ids()?;
        let count = self.count;
        let mut keys = IdKeys {
            ids: &mut self.ids[..count],
            pool: &self.pool,
            bytes_start: &self.bytes_start,
        };
        self.radix.sort(&mut keys, 0, count)?;
        Ok(TermIds { hash: self })
    }

    /// Shrinks the table while it is at least 8 buckets and less than a fifth full.
    fn shrink(&mut self, target_count: usize) -> bool {
        let mut new_size = self.hash_size;
        while new_size >= 8 && new_size / 5 > target_count {
            new_size /= 2;
        }
        if new_size == self.hash_size {
            return false;
        }
        self.bytes_used
            .add_and_get(-((self.hash_size - new_size) as i64) * ID_BYTES);
        debug!(
            old_size = self.hash_size,
            new_size,
            last_count = target_count,
            "term hash shrunk"
        );
        self.ids = vec![EMPTY; new_size];
        self.hash_size = new_size;
        self.hash_half_size = new_size / 2;
        self.hash_mask = new_size - 1;
        true
    }

    /// Forgets all terms and makes the hash accept adds again.
    ///
    /// With `reset_pool`, the pool is reset and its blocks handed back to the
    /// allocator. A table that was less than a fifth full is shrunk.
    pub fn clear(&mut self, reset_pool: bool) {
        let last_count = self.count;
        self.count = 0;
        if reset_pool {
            self.pool.reset(false, false);
        }
        self.bytes_start.clear();
        if self.state == State::Closed {
            return;
        }
        self.state = State::Active;
        if !self.shrink(last_count) {
            self.ids.fill(EMPTY);
        }
    }

    /// Clears the hash including its pool and releases the bucket table.
    ///
    /// Every later operation fails with [`Error::Closed`] until [`reinit`](Self::reinit).
    pub fn close(&mut self) {
        self.clear(true);
        if self.state == State::Closed {
            return;
        }
        self.bytes_used
            .add_and_get(-(self.ids.len() as i64) * ID_BYTES);
        self.ids = Vec::new();
        self.bytes_start = Vec::new();
        self.state = State::Closed;
        debug!(table_size = self.hash_size, "term hash closed");
    }

    /// Reallocates the bucket table after [`close`](Self::close). No-op otherwise.
    pub fn reinit(&mut self) {
        if self.state != State::Closed {
            return;
        }
        self.ids = vec![EMPTY; self.hash_size];
        self.bytes_used
            .add_and_get(self.hash_size as i64 * ID_BYTES);
        self.state = State::Active;
    }
}

/// [`ByteAt`] view over the dense id prefix, reading terms from the pool.
struct IdKeys<'a, A: BlockAllocator> {
    ids: &'a mut [i32],
    pool: &'a ByteBlockPool<A>,
    bytes_start: &'a [usize],
}

impl<A: BlockAllocator> ByteAt for IdKeys<'_, A> {
    #[inline]
    fn byte_at(&mut self, i: usize, k: usize) -> Option<u8> {
        let start = self.bytes_start[self.ids[i] as usize];
        term_at(self.pool, start).get(k).copied()
    }

    #[inline]
    fn swap(&mut self, i: usize, j: usize) {
        self.ids.swap(i, j);
    }
}

/// Read-only view of the ids of a compacted or sorted [`BytesRefHash`].
pub struct TermIds<'a, A: BlockAllocator = DirectAllocator> {
    hash: &'a BytesRefHash<A>,
}

impl<'a, A: BlockAllocator> TermIds<'a, A> {
    /// The dense ids, in compacted or sorted order.
    pub fn ids(&self) -> &'a [i32] {
        &self.hash.ids[..self.hash.count]
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.hash.count
    }

    /// Returns `true` if the hash held no terms.
    pub fn is_empty(&self) -> bool {
        self.hash.count == 0
    }

    /// The term at position `pos` of the view.
    pub fn term(&self, pos: usize) -> &'a [u8] {
        self.hash.get(self.ids()[pos])
    }

    /// Terms in view order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let hash = self.hash;
        self.ids().iter().map(move |&id| hash.get(id))
    }

    /// Copies the ids out, ending the borrow of the hash.
    pub fn to_vec(&self) -> Vec<i32> {
        self.ids().to_vec()
    }
}
