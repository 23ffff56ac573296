//! # Termpool
//!
//! `termpool` interns byte terms into a block arena, hands out dense ids and
//! sorts them, together with the family of sorters and selectors it is built on.
//!
//! ## Key Features
//!
//! - **Block arena**: [`ByteBlockPool`] appends bytes into fixed-size blocks drawn
//!   from a pluggable [`BlockAllocator`], with zero-copy reads inside a block.
//! - **Term hash**: [`BytesRefHash`] deduplicates terms, assigns ids `0, 1, 2, ...`
//!   and returns them in term order through an MSB radix sort.
//! - **Sorting contract**: every algorithm runs on the small [`Sortable`],
//!   [`MergeSortable`] and [`ByteAt`] traits, so any indexable storage can be
//!   sorted without copying it.
//! - **Algorithms**: [`IntroSorter`], [`TimSorter`], [`InPlaceMergeSorter`],
//!   [`MsbRadixSorter`], [`IntroSelector`] and [`RadixSelector`].
//!
//! ## Usage
//!
//! ### Interning terms
//!
//! ```rust
//! use termpool::prelude::*;
//!
//! let mut hash = BytesRefHash::new(ByteBlockPool::default());
//! for term in ["banana", "apple", "apple", "cherry"] {
//!     hash.add(term.as_bytes()).unwrap();
//! }
//! assert_eq!(hash.len(), 3);
//!
//! let sorted = hash.sort().unwrap();
//! let terms: Vec<&[u8]> = sorted.iter().collect();
//! assert_eq!(terms, vec![&b"apple"[..], &b"banana"[..], &b"cherry"[..]]);
//! ```
//!
//! ### Sorting collections
//!
//! For standard collections like `Vec<String>` or `Vec<Vec<u8>>`, use
//! [`sort_indices`] (index-based) or [`sort_keys`] (in-place). Other data
//! structures can implement [`KeyAccessor`].
//!
//! ```rust
//! use termpool::{sort_indices, KeyAccessor};
//!
//! struct User {
//!     username: String,
//! }
//!
//! // Wrapper struct to avoid orphan rule violation (impl foreign trait on foreign type).
//! struct Users(Vec<User>);
//!
//! impl KeyAccessor for Users {
//!     fn get_key(&self, index: usize) -> &[u8] {
//!         self.0[index].username.as_bytes()
//!     }
//!
//!     fn len(&self) -> usize {
//!         self.0.len()
//!     }
//! }
//!
//! let users = Users(vec![
//!     User { username: "Bob".to_string() },
//!     User { username: "Alice".to_string() },
//! ]);
//!
//! assert_eq!(sort_indices(&users), vec![1, 0]);
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Radix sort**: linear in the number of distinguishing bytes; ranges of at
//!   most 100 entries and recursion past 8 levels switch to intro sort.
//! - **Tim sort**: `O(n log n)`, linear on presorted input, never more than
//!   `max_temp_slots` entries of scratch.
//! - **Term hash**: the bucket table doubles at half occupancy; terms cost their
//!   length plus a 1 or 2 byte prefix in the arena.
//!
//! None of the types are synchronized: each structure has a single owner.

pub mod algo;
pub mod allocator;
pub mod comparator;
pub mod config;
pub mod core;
pub mod counter;
pub mod error;
pub mod hash;
pub mod intro;
pub mod murmur;
pub mod pool;
pub mod radix;
pub mod sorter;
pub mod timsort;

pub use algo::{select_indices, sort_indices, sort_indices_by, sort_keys, stable_sort_indices};
pub use allocator::{BlockAllocator, DirectAllocator, DirectTrackingAllocator, RecyclingBlockAllocator};
pub use comparator::{BytesComparator, FixedWidth, Unsigned};
pub use config::{HashConfig, RadixConfig};
pub use core::{ByteAt, KeyAccessor, MergeSortable, Sortable};
pub use counter::Counter;
pub use error::{Error, Result};
pub use hash::{BytesRefHash, TermIds};
pub use intro::{IntroSelector, IntroSorter};
pub use pool::ByteBlockPool;
pub use radix::{MsbRadixSorter, RadixSelector};
pub use sorter::InPlaceMergeSorter;
pub use timsort::TimSorter;

pub mod prelude {
    pub use crate::algo::{sort_indices, sort_keys, stable_sort_indices};
    pub use crate::allocator::{BlockAllocator, DirectAllocator};
    pub use crate::core::{ByteAt, KeyAccessor, MergeSortable, Sortable};
    pub use crate::counter::Counter;
    pub use crate::error::{Error, Result};
    pub use crate::hash::BytesRefHash;
    pub use crate::pool::ByteBlockPool;
}
