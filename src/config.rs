//! Configuration knobs for the hash index and the radix family.

/// Default number of hash buckets.
pub const DEFAULT_CAPACITY: usize = 16;

/// Largest bucket table a [`BytesRefHash`](crate::hash::BytesRefHash) grows to.
pub const MAX_HASH_SIZE: usize = 1 << 30;

/// Hash index configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashConfig {
    /// Initial number of buckets. Rounded up to a power of two in `[2, MAX_HASH_SIZE]`.
    pub capacity: usize,
    /// Hash seed for this instance. `None` uses the process-wide seed.
    pub seed: Option<u32>,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            seed: None,
        }
    }
}

impl HashConfig {
    /// Sets the initial bucket count.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Pins the hash seed for this instance.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Bucket count actually used for `capacity`.
    pub(crate) fn table_size(&self) -> usize {
        self.capacity.clamp(2, MAX_HASH_SIZE).next_power_of_two()
    }

    pub(crate) fn resolved_seed(&self) -> u32 {
        self.seed
            .unwrap_or_else(crate::murmur::good_fast_hash_seed)
    }
}

/// Radix sort and radix select configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadixConfig {
    /// Ranges of at most this many entries go to the comparison fallback.
    pub length_threshold: usize,
    /// Recursion levels after which the comparison fallback takes over.
    pub level_threshold: usize,
    /// Bytes past this offset are ignored when ordering keys.
    pub max_length: usize,
}

impl Default for RadixConfig {
    fn default() -> Self {
        Self {
            length_threshold: 100,
            level_threshold: 8,
            max_length: usize::MAX,
        }
    }
}

impl RadixConfig {
    /// Only order keys on their first `max_length` bytes.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        assert!(max_length > 0, "max_length must be positive");
        self.max_length = max_length;
        self
    }

    /// Sets the fallback range size.
    pub fn with_length_threshold(mut self, length_threshold: usize) -> Self {
        self.length_threshold = length_threshold;
        self
    }

    /// Sets the fallback recursion depth.
    pub fn with_level_threshold(mut self, level_threshold: usize) -> Self {
        self.level_threshold = level_threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size_rounding() {
        assert_eq!(HashConfig::default().table_size(), 16);
        assert_eq!(HashConfig::default().with_capacity(0).table_size(), 2);
        assert_eq!(HashConfig::default().with_capacity(100).table_size(), 128);
        assert_eq!(
            HashConfig::default().with_capacity(usize::MAX).table_size(),
            MAX_HASH_SIZE
        );
    }

    #[test]
    fn test_pinned_seed_wins() {
        assert_eq!(HashConfig::default().with_seed(7).resolved_seed(), 7);
    }
}
