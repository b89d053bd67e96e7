//! Per-pass deterministic random sequence

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed every generator pass starts from.
pub const PASS_SEED: u64 = 0;

/// Random sequence owned by a single generator pass.
///
/// Each pass creates a fresh sequence, so re-running a generator over the same
/// inputs yields the same elements. Generators draw a fixed number of values
/// per visited cell whether or not the cell emits anything.
pub struct PassRng(ChaCha8Rng);

impl Default for PassRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(PASS_SEED))
    }
}

impl PassRng {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next non-negative 31-bit value
    #[inline]
    pub fn next_u31(&mut self) -> u32 {
        self.0.next_u32() >> 1
    }

    /// Next value in `0..=255`
    #[inline]
    pub fn next_byte(&mut self) -> u32 {
        self.next_u31() & 255
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_restarts_per_pass() {
        let mut a = PassRng::new();
        let first: Vec<u32> = (0..8).map(|_| a.next_u31()).collect();
        let mut b = PassRng::new();
        let second: Vec<u32> = (0..8).map(|_| b.next_u31()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|&v| v < (1 << 31)));
    }

    #[test]
    fn test_byte_range() {
        let mut rng = PassRng::new();
        assert!((0..1000).all(|_| rng.next_byte() <= 255));
    }
}
