//! Deterministic RNG for allocation draws
//!
//! This module provides a no_std compatible RNG trait and implementation.
//! Generation is reproducible rather than secure: the same seed and the same
//! configuration always produce the same population.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

/// Source of randomness for tier and variant draws
pub trait DrawRng {
    /// Generate a random u32
    fn next_u32(&mut self) -> u32;

    /// Generate a random u64 from two consecutive u32 draws
    fn next_u64(&mut self) -> u64 {
        let high = self.next_u32() as u64;
        let low = self.next_u32() as u64;
        (high << 32) | low
    }

    /// Generate a random number in range [0, max)
    fn gen_below(&mut self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }
        self.next_u64() % max
    }

    /// Cumulative-weight draw over `(item, weight)` pairs in the given order.
    ///
    /// Draws `r` in `[0, total)` and walks the candidates subtracting each
    /// weight; the candidate that takes the remainder below zero wins.
    /// Zero-weight candidates can never be chosen. Returns `None` when the
    /// total weight is zero.
    fn pick_weighted<T: Copy>(&mut self, candidates: &[(T, u64)]) -> Option<T> {
        let total: u64 = candidates.iter().map(|(_, weight)| *weight).sum();
        if total == 0 {
            return None;
        }

        let mut remainder = self.gen_below(total);
        for &(item, weight) in candidates {
            if remainder < weight {
                return Some(item);
            }
            remainder -= weight;
        }
        None
    }
}

impl<R: DrawRng + ?Sized> DrawRng for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

/// XorShift32 RNG - simple, fast, deterministic
///
/// The same seed will always produce the same sequence.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    /// Create a new RNG from a u64 seed
    ///
    /// The seed is folded into a u32, ensuring state is never 0.
    pub fn seed_from_u64(seed: u64) -> Self {
        let state = ((seed as u32) ^ ((seed >> 32) as u32)).max(1);
        Self { state }
    }

    /// Create a new RNG from a u32 seed
    pub fn seed_from_u32(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }
}

impl DrawRng for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
