//! Error types for `termpool`.
//!
//! Capacity errors are raised before any state is modified, so the caller can
//! drop the offending term (or document) and keep using the structure.

/// Errors raised by the arena, the hash index and the sorters.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A term does not fit in a single arena block together with its length prefix.
    #[error("bytes can be at most {max} in length; got {length}")]
    TermTooLong {
        /// Length of the rejected term.
        length: usize,
        /// Largest storable term length.
        max: usize,
    },

    /// Integer overflow while computing a new table size or arena offset.
    #[error("integer overflow while growing {what}")]
    Overflow {
        /// The structure that could not grow.
        what: &'static str,
    },

    /// An internal array could not be grown to the requested length.
    #[error("requested array length {requested} exceeds the maximum allocatable length")]
    ArrayTooLarge {
        /// Number of elements requested.
        requested: usize,
    },

    /// `to < from`, or the range runs past the end of the collection.
    #[error("'to' must be >= 'from', got from={from} and to={to}")]
    InvalidRange {
        /// Start of the range.
        from: usize,
        /// End of the range (exclusive).
        to: usize,
    },

    /// A selection rank outside of `[from, to)`.
    #[error("k must be in [{from}, {to}), got k={k}")]
    RankOutOfRange {
        /// Start of the range.
        from: usize,
        /// End of the range (exclusive).
        to: usize,
        /// Requested rank.
        k: usize,
    },

    /// The hash was compacted or sorted; `clear()` it before adding again.
    #[error("hash ids were compacted; call clear() before adding")]
    Finalized,

    /// The hash was closed; `reinit()` it before using it again.
    #[error("hash is closed; call reinit() before use")]
    Closed,
}

impl Error {
    /// Coarse label for the failure, either `"capacity"` or `"misuse"`.
    pub fn category(&self) -> &'static str {
        match self {
            Self::TermTooLong { .. } | Self::Overflow { .. } | Self::ArrayTooLarge { .. } => {
                "capacity"
            }
            Self::InvalidRange { .. }
            | Self::RankOutOfRange { .. }
            | Self::Finalized
            | Self::Closed => "misuse",
        }
    }

    /// Returns `true` for errors caused by the size of the input rather than by the caller.
    pub fn is_capacity(&self) -> bool {
        self.category() == "capacity"
    }
}

/// Result type alias for `termpool` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Validates a sort range.
#[inline]
pub(crate) fn check_range(from: usize, to: usize) -> Result<()> {
    if to < from {
        return Err(Error::InvalidRange { from, to });
    }
    Ok(())
}

/// Validates a selection range and rank.
#[inline]
pub(crate) fn check_rank(from: usize, to: usize, k: usize) -> Result<()> {
    check_range(from, to)?;
    if k < from || k >= to {
        return Err(Error::RankOutOfRange { from, to, k });
    }
    Ok(())
}
