//! Append-only byte arena built from fixed-size blocks.
//!
//! Offsets into the pool are absolute: offset `p` lives in block
//! `p >> BLOCK_SHIFT` at position `p & BLOCK_MASK`. Blocks are created lazily
//! when the current one overflows and are only released as a whole on
//! [`ByteBlockPool::reset`].

use crate::allocator::{BlockAllocator, DirectAllocator};
use crate::error::{Error, Result};
use tracing::debug;

/// Log2 of the block size.
pub const BLOCK_SHIFT: usize = 15;
/// Size of a single arena block in bytes.
pub const BLOCK_SIZE: usize = 1 << BLOCK_SHIFT;
/// Mask extracting the in-block position from an absolute offset.
pub const BLOCK_MASK: usize = BLOCK_SIZE - 1;

/// A growable list of `BLOCK_SIZE` byte blocks with a write cursor.
#[derive(Debug)]
pub struct ByteBlockPool<A: BlockAllocator = DirectAllocator> {
    blocks: Vec<Box<[u8]>>,
    /// Write position inside the last block. `BLOCK_SIZE` when no block exists yet.
    byte_upto: usize,
    allocator: A,
}

impl Default for ByteBlockPool<DirectAllocator> {
    fn default() -> Self {
        Self::new(DirectAllocator)
    }
}

impl<A: BlockAllocator> ByteBlockPool<A> {
    /// Creates an empty pool drawing blocks from `allocator`.
    pub fn new(allocator: A) -> Self {
        Self {
            blocks: Vec::new(),
            byte_upto: BLOCK_SIZE,
            allocator,
        }
    }

    /// The allocator backing this pool.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Number of blocks currently held.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns block `index`.
    #[inline]
    pub fn block(&self, index: usize) -> &[u8] {
        &self.blocks[index]
    }

    /// Write position inside the current block.
    #[inline]
    pub fn byte_upto(&self) -> usize {
        self.byte_upto
    }

    /// Absolute offset of the start of the current block.
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.blocks.len().saturating_sub(1) * BLOCK_SIZE
    }

    /// Absolute offset of the next byte to be written.
    #[inline]
    pub fn position(&self) -> usize {
        match self.blocks.len() {
            0 => 0,
            n => (n - 1) * BLOCK_SIZE + self.byte_upto,
        }
    }

    /// Bytes left in the current block.
    #[inline]
    pub fn remaining_in_block(&self) -> usize {
        BLOCK_SIZE - self.byte_upto
    }

    /// Total bytes held in blocks.
    pub fn allocated_bytes(&self) -> usize {
        self.blocks.len() * BLOCK_SIZE
    }

    /// Moves the cursor to the start of a fresh block.
    pub fn next_buffer(&mut self) -> Result<()> {
        self.blocks
            .len()
            .checked_add(1)
            .and_then(|n| n.checked_mul(BLOCK_SIZE))
            .ok_or(Error::Overflow { what: "byte pool" })?;
        let block = self.allocator.get_block();
        debug_assert_eq!(block.len(), BLOCK_SIZE);
        self.blocks.push(block);
        self.byte_upto = 0;
        Ok(())
    }

    #[inline]
    fn current_block(&mut self) -> &mut [u8] {
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    /// Fails with `Overflow` if `length` more bytes would move the cursor past `usize::MAX`.
    fn check_addressable(&self, length: usize) -> Result<()> {
        self.position()
            .checked_add(length)
            .and_then(|end| end.checked_add(BLOCK_SIZE))
            .map(|_| ())
            .ok_or(Error::Overflow { what: "byte pool" })
    }

    /// Copies `bytes` to the cursor, spilling into new blocks as needed.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.check_addressable(bytes.len())?;
        let mut rest = bytes;
        while !rest.is_empty() {
            let buffer_left = self.remaining_in_block();
            let upto = self.byte_upto;
            if rest.len() < buffer_left {
                self.current_block()[upto..upto + rest.len()].copy_from_slice(rest);
                self.byte_upto += rest.len();
                break;
            }
            let (head, tail) = rest.split_at(buffer_left);
            if buffer_left > 0 {
                self.current_block()[upto..].copy_from_slice(head);
            }
            self.next_buffer()?;
            rest = tail;
        }
        Ok(())
    }

    /// Copies `length` bytes starting at `offset` in `src` to the cursor.
    pub fn append_from<B: BlockAllocator>(
        &mut self,
        src: &ByteBlockPool<B>,
        mut offset: usize,
        length: usize,
    ) -> Result<()> {
        self.check_addressable(length)?;
        let mut bytes_left = length;
        while bytes_left > 0 {
            let buffer_left = self.remaining_in_block();
            let upto = self.byte_upto;
            if bytes_left < buffer_left {
                src.read_bytes(offset, &mut self.current_block()[upto..upto + bytes_left]);
                self.byte_upto += bytes_left;
                break;
            }
            if buffer_left > 0 {
                src.read_bytes(offset, &mut self.current_block()[upto..]);
            }
            self.next_buffer()?;
            bytes_left -= buffer_left;
            offset += buffer_left;
        }
        Ok(())
    }

    /// Fills `dst` with the bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range was never written.
    pub fn read_bytes(&self, offset: usize, dst: &mut [u8]) {
        let mut block = offset >> BLOCK_SHIFT;
        let mut pos = offset & BLOCK_MASK;
        let mut filled = 0;
        while filled < dst.len() {
            let chunk = (dst.len() - filled).min(BLOCK_SIZE - pos);
            dst[filled..filled + chunk].copy_from_slice(&self.blocks[block][pos..pos + chunk]);
            filled += chunk;
            block += 1;
            pos = 0;
        }
    }

    /// Reads the byte at `offset`.
    #[inline]
    pub fn read_byte(&self, offset: usize) -> u8 {
        self.blocks[offset >> BLOCK_SHIFT][offset & BLOCK_MASK]
    }

    /// Returns the `length` bytes at `offset`.
    ///
    /// Borrows straight from the block when the range fits in one; otherwise
    /// copies into `scratch` and borrows from it.
    pub fn materialize<'a>(
        &'a self,
        offset: usize,
        length: usize,
        scratch: &'a mut Vec<u8>,
    ) -> &'a [u8] {
        if length == 0 {
            return &[];
        }
        let pos = offset & BLOCK_MASK;
        if pos + length <= BLOCK_SIZE {
            return &self.blocks[offset >> BLOCK_SHIFT][pos..pos + length];
        }
        scratch.clear();
        scratch.resize(length, 0);
        self.read_bytes(offset, scratch);
        scratch.as_slice()
    }

    /// Drops all content.
    ///
    /// With `zero_fill`, every written byte is zeroed before blocks are handed
    /// back. With `reuse_first`, block 0 is kept and the cursor rewinds to its
    /// start; all other blocks go back to the allocator in one call.
    pub fn reset(&mut self, zero_fill: bool, reuse_first: bool) {
        if self.blocks.is_empty() {
            return;
        }
        let last = self.blocks.len() - 1;
        if zero_fill {
            self.blocks[..last].iter_mut().for_each(|b| b.fill(0));
            let upto = self.byte_upto;
            self.blocks[last][..upto].fill(0);
        }
        let released = self.blocks.len() - usize::from(reuse_first);
        if released > 0 {
            let keep = usize::from(reuse_first);
            self.allocator.recycle_blocks(&mut self.blocks[keep..]);
            self.blocks.truncate(keep);
        }
        self.byte_upto = if reuse_first { 0 } else { BLOCK_SIZE };
        debug!(released, zero_fill, reuse_first, "byte pool reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_position() {
        let pool = ByteBlockPool::default();
        assert_eq!(pool.position(), 0);
        assert_eq!(pool.block_count(), 0);
        assert_eq!(pool.remaining_in_block(), 0);
    }

    #[test]
    fn test_exact_fill_starts_next_block() {
        let mut pool = ByteBlockPool::default();
        pool.append(&vec![7u8; BLOCK_SIZE]).unwrap();
        assert_eq!(pool.block_count(), 2);
        assert_eq!(pool.position(), BLOCK_SIZE);
        assert_eq!(pool.read_byte(BLOCK_SIZE - 1), 7);
    }

    #[test]
    fn test_materialize_empty_range() {
        let mut scratch = Vec::new();
        let pool = ByteBlockPool::default();
        assert!(pool.materialize(0, 0, &mut scratch).is_empty());

        let mut pool = ByteBlockPool::default();
        pool.append(b"abc").unwrap();
        assert!(pool.materialize(3, 0, &mut scratch).is_empty());
        assert!(pool.materialize(5 * BLOCK_SIZE, 0, &mut scratch).is_empty());
    }
}
