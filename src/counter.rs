//! Memory accounting.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// A shared accumulator of bytes used.
///
/// Clones share the same underlying value, so one counter can be handed to an
/// allocator and a hash at construction time and read back by the owner.
/// The counter is `Send + Sync`, so a pool or hash reporting into it can be
/// moved to the thread that builds a segment. Updates are relaxed: the value
/// is an accounting total, not a synchronization point.
#[derive(Clone, Debug, Default)]
pub struct Counter {
    value: Arc<AtomicI64>,
}

impl Counter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` (which may be negative) and returns the new value.
    #[inline]
    pub fn add_and_get(&self, delta: i64) -> i64 {
        self.value.fetch_add(delta, Ordering::Relaxed) + delta
    }

    /// Returns the current value.
    #[inline]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}
