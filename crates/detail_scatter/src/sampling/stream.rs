//! Seeded, cursor-indexed sample stream.
//!
//! The value at each cursor position is a pure function of `(seed, index)`: the stream
//! keeps no generator state beyond the cursor. Rewinding with [`SampleStream::reset`] and
//! replaying the same sequence of draws reproduces identical values, which is what makes
//! regeneration reproducible.
use rand::RngCore;

use crate::sampling::rand01;

pub const DEFAULT_SEED: u64 = 0x00D3_7A11_5EED;

const GOLDEN_GAMMA: u64 = 0x9E3779B97F4A7C15;

/// Deterministic number stream addressed by a resettable cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleStream {
    seed: u64,
    start_index: u64,
    cursor: u64,
}

impl Default for SampleStream {
    fn default() -> Self {
        Self::new(DEFAULT_SEED, 0)
    }
}

impl SampleStream {
    /// Creates a stream positioned at `start_index`.
    pub fn new(seed: u64, start_index: u64) -> Self {
        Self {
            seed,
            start_index,
            cursor: start_index,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn start_index(&self) -> u64 {
        self.start_index
    }

    /// Current cursor position.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Number of draws taken since the last reset.
    pub fn draws(&self) -> u64 {
        self.cursor.wrapping_sub(self.start_index)
    }

    /// Rewinds the cursor to the start index.
    pub fn reset(&mut self) {
        self.cursor = self.start_index;
    }

    /// The `[0, 1)` value at `index`, without moving the cursor.
    pub fn value_at(&self, index: u64) -> f32 {
        rand01(high_bits(self.hash_at(index)))
    }

    #[inline]
    fn hash_at(&self, index: u64) -> u64 {
        mix_u64(
            self.seed
                .wrapping_add(index.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA)),
        )
    }

    #[inline]
    fn advance(&mut self) -> u64 {
        let h = self.hash_at(self.cursor);
        self.cursor = self.cursor.wrapping_add(1);
        h
    }
}

impl RngCore for SampleStream {
    fn next_u32(&mut self) -> u32 {
        high_bits(self.advance())
    }

    fn next_u64(&mut self) -> u64 {
        self.advance()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[inline]
fn high_bits(h: u64) -> u32 {
    (h >> 32) as u32
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}
