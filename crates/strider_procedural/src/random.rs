//! # Random Sources
//!
//! Every random decision in generation goes through [`RandomSource`], so tests
//! can script the draws and production runs stay reproducible.
//!
//! ## Determinism Guarantee
//!
//! Given the same `GenerationSeed`, [`SeededRandom`] produces **exactly** the
//! same sequence on any platform. ChaCha8 is used for its portable output.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for deterministic generation.
///
/// All procedural streams derive from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GenerationSeed(u64);

impl GenerationSeed {
    /// Stream used by the grammar generator.
    pub const GRAMMAR_STREAM: u64 = 0x6772_616D;
    /// Stream used by section template selection.
    pub const SPAWNER_STREAM: u64 = 0x7370_776E;

    /// Creates a new seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for a specific purpose.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for GenerationSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// A source of uniform random draws.
pub trait RandomSource {
    /// Returns a uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Returns a uniform index in `[0, len)`.
    ///
    /// Callers never pass `len == 0`.
    fn next_index(&mut self, len: usize) -> usize;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn next_unit(&mut self) -> f32 {
        (**self).next_unit()
    }

    #[inline]
    fn next_index(&mut self, len: usize) -> usize {
        (**self).next_index(len)
    }
}

/// ChaCha8-backed [`RandomSource`].
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a source from a seed.
    #[must_use]
    pub fn new(seed: GenerationSeed) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed.value()),
        }
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    #[inline]
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}
