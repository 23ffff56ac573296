//! Block allocators backing a [`ByteBlockPool`](crate::pool::ByteBlockPool).
//!
//! A pool asks its allocator for fixed-size blocks and hands whole runs of
//! blocks back on reset. What happens to recycled blocks is up to the
//! allocator: they can be dropped, dropped with accounting, or kept around
//! for reuse.

use crate::counter::Counter;
use crate::pool::BLOCK_SIZE;

/// Source of `BLOCK_SIZE` byte blocks.
pub trait BlockAllocator {
    /// Returns a block of exactly `BLOCK_SIZE` bytes. Contents are unspecified.
    fn get_block(&mut self) -> Box<[u8]>;

    /// Takes back a run of blocks. The pool discards the slots afterwards.
    fn recycle_blocks(&mut self, blocks: &mut [Box<[u8]>]);
}

#[inline]
fn new_block() -> Box<[u8]> {
    vec![0u8; BLOCK_SIZE].into_boxed_slice()
}

/// Always allocates a fresh block; recycling is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectAllocator;

impl BlockAllocator for DirectAllocator {
    fn get_block(&mut self) -> Box<[u8]> {
        new_block()
    }

    fn recycle_blocks(&mut self, _blocks: &mut [Box<[u8]>]) {}
}

/// Allocates fresh blocks and reports every allocated and recycled byte.
#[derive(Clone, Debug)]
pub struct DirectTrackingAllocator {
    bytes_used: Counter,
}

impl DirectTrackingAllocator {
    /// Creates an allocator reporting into `bytes_used`.
    pub fn new(bytes_used: Counter) -> Self {
        Self { bytes_used }
    }

    /// The counter this allocator reports into.
    pub fn bytes_used(&self) -> &Counter {
        &self.bytes_used
    }
}

impl BlockAllocator for DirectTrackingAllocator {
    fn get_block(&mut self) -> Box<[u8]> {
        self.bytes_used.add_and_get(BLOCK_SIZE as i64);
        new_block()
    }

    fn recycle_blocks(&mut self, blocks: &mut [Box<[u8]>]) {
        self.bytes_used
            .add_and_get(-((blocks.len() * BLOCK_SIZE) as i64));
        blocks.iter_mut().for_each(|b| *b = Box::default());
    }
}

/// Keeps up to `max_buffered_blocks` recycled blocks and hands them out again.
///
/// Reused blocks are not cleared. The counter tracks blocks that are either
/// handed out or buffered here.
#[derive(Debug)]
pub struct RecyclingBlockAllocator {
    free: Vec<Box<[u8]>>,
    max_buffered_blocks: usize,
    bytes_used: Counter,
}

impl RecyclingBlockAllocator {
    /// Default number of buffered blocks.
    pub const DEFAULT_BUFFERED_BLOCKS: usize = 64;

    /// Creates an allocator buffering at most `max_buffered_blocks` free blocks.
    pub fn new(max_buffered_blocks: usize, bytes_used: Counter) -> Self {
        Self {
            free: Vec::new(),
            max_buffered_blocks,
            bytes_used,
        }
    }

    /// Number of buffered free blocks.
    pub fn num_buffered_blocks(&self) -> usize {
        self.free.len()
    }

    /// Maximum number of buffered free blocks.
    pub fn max_buffered_blocks(&self) -> usize {
        self.max_buffered_blocks
    }

    /// The counter this allocator reports into.
    pub fn bytes_used(&self) -> &Counter {
        &self.bytes_used
    }

    /// Drops up to `num` buffered blocks and returns how many were dropped.
    pub fn free_blocks(&mut self, num: usize) -> usize {
        let keep = self.free.len().saturating_sub(num);
        let freed = self.free.len() - keep;
        self.free.truncate(keep);
        self.bytes_used.add_and_get(-((freed * BLOCK_SIZE) as i64));
        freed
    }
}

impl Default for RecyclingBlockAllocator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFERED_BLOCKS, Counter::new())
    }
}

impl BlockAllocator for RecyclingBlockAllocator {
    fn get_block(&mut self) -> Box<[u8]> {
        match self.free.pop() {
            Some(block) => block,
            None => {
                self.bytes_used.add_and_get(BLOCK_SIZE as i64);
                new_block()
            }
        }
    }

    fn recycle_blocks(&mut self, blocks: &mut [Box<[u8]>]) {
        let keep = (self.max_buffered_blocks - self.free.len().min(self.max_buffered_blocks))
            .min(blocks.len());
        let (kept, dropped) = blocks.split_at_mut(keep);
        self.free
            .extend(kept.iter_mut().map(std::mem::take));
        dropped.iter_mut().for_each(|b| *b = Box::default());
        self.bytes_used
            .add_and_get(-((dropped.len() * BLOCK_SIZE) as i64));
    }
}
