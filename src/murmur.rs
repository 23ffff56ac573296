//! 32-bit MurmurHash3 and the process-wide hash seed.

use std::hash::{BuildHasher, RandomState};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Environment variable that pins the process-wide hash seed.
pub const HASH_SEED_ENV: &str = "TERMPOOL_HASH_SEED";

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// MurmurHash3 x86 32-bit variant of `data` with `seed`.
///
/// Blocks are read little-endian, so the result does not depend on the host.
pub fn murmurhash3_x86_32(data: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;
    let mut blocks = data.chunks_exact(4);

    for block in &mut blocks {
        let mut k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);

        h1 ^= k1;
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    let mut k1 = 0u32;
    if tail.len() == 3 {
        k1 ^= (tail[2] as u32) << 16;
    }
    if tail.len() >= 2 {
        k1 ^= (tail[1] as u32) << 8;
    }
    if !tail.is_empty() {
        k1 ^= tail[0] as u32;
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= data.len() as u32;
    fmix32(h1)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Seed shared by every hash index that was not given one explicitly.
///
/// Computed once per process. Set [`HASH_SEED_ENV`] to a decimal or `0x`-prefixed
/// hex `u32` to make bucket layouts reproducible; otherwise the seed is random.
pub fn good_fast_hash_seed() -> u32 {
    static SEED: OnceLock<u32> = OnceLock::new();
    *SEED.get_or_init(|| match std::env::var(HASH_SEED_ENV) {
        Ok(value) => match parse_seed(&value) {
            Some(seed) => {
                debug!(seed, "using hash seed from environment");
                seed
            }
            None => {
                warn!(value = %value, "ignoring unparsable hash seed");
                random_seed()
            }
        },
        Err(_) => random_seed(),
    })
}

fn parse_seed(value: &str) -> Option<u32> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn random_seed() -> u32 {
    let bits = RandomState::new().hash_one(0x5eed_u64);
    (bits ^ (bits >> 32)) as u32
}
