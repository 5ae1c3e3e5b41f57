// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Deterministic random source for reproducible sampling.
//!
//! Sampling runs are reproducible when the caller threads an explicit
//! [`RandomSource`] through the sampler instead of relying on ambient
//! process-wide seeding. The sampler derives one seed per generation batch
//! and passes it to the oracle via
//! [`GenerateOptions`](crate::oracle::GenerateOptions).

/// Simple deterministic PRNG (linear congruential).
///
/// Not cryptographically secure. Used only to derive per-batch oracle seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSource(u64);

impl RandomSource {
    /// Create from seed.
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Get next random u64.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(1664525).wrapping_add(1013904223);
        self.0
    }

    /// Derive an independent stream, advancing this one.
    ///
    /// Lets parallel search branches own their own source without
    /// sharing mutable state.
    pub fn fork(&mut self) -> Self {
        Self(self.next_u64() ^ 0x9e37_79b9_7f4a_7c15)
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_sequence() {
        let mut a = RandomSource::new(7);
        let mut b = RandomSource::new(7);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_seeds_differ() {
        let mut a = RandomSource::new(1);
        let mut b = RandomSource::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_fork_diverges() {
        let mut root = RandomSource::new(42);
        let mut left = root.fork();
        let mut right = root.fork();
        assert_ne!(left.next_u64(), right.next_u64());
    }
}
