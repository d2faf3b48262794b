//! Secure Random Number Generation
//!
//! Single source of randomness for the whole crate. Dice rolls, commitment
//! keys and committed values all draw from [`SecureRng`], so there is exactly
//! one bias-free uniform-integer routine to audit.

use std::num::NonZeroU64;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

/// The secure entropy source could not produce bytes.
///
/// This is fatal for the operation in progress. There is no fallback to a
/// non-cryptographic generator.
#[derive(Debug, Error)]
#[error("secure randomness unavailable: {0}")]
pub struct RandomnessError(pub String);

impl From<rand::Error> for RandomnessError {
    fn from(err: rand::Error) -> Self {
        Self(err.to_string())
    }
}

/// Cryptographically strong RNG wrapper.
///
/// Backed by the operating system's entropy source by default. Any other
/// `CryptoRng` can be injected with [`SecureRng::from_rng`], which keeps tests
/// reproducible without weakening the production path.
///
/// # Example
///
/// ```
/// use std::num::NonZeroU64;
/// use fair_dice::core::rng::SecureRng;
///
/// let mut rng = SecureRng::new();
/// let bound = NonZeroU64::new(6).unwrap();
/// let value = rng.uniform(bound).unwrap();
/// assert!(value < 6);
/// ```
#[derive(Debug)]
pub struct SecureRng<R = OsRng> {
    inner: R,
}

impl SecureRng<OsRng> {
    /// Create an RNG backed by OS entropy.
    pub fn new() -> Self {
        Self { inner: OsRng }
    }
}

impl Default for SecureRng<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> SecureRng<R> {
    /// Wrap an arbitrary cryptographic RNG.
    pub fn from_rng(inner: R) -> Self {
        Self { inner }
    }

    /// Fill `dest` with random bytes.
    pub fn fill(&mut self, dest: &mut [u8]) -> Result<(), RandomnessError> {
        self.inner.try_fill_bytes(dest)?;
        Ok(())
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> Result<u64, RandomnessError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Generate a uniformly distributed integer in `[0, bound)`.
    ///
    /// Uses rejection sampling: raw draws at or above the largest multiple of
    /// `bound` that fits in a `u64` are discarded, so every residue is equally
    /// likely. The expected number of draws is below 2 for any bound.
    pub fn uniform(&mut self, bound: NonZeroU64) -> Result<u64, RandomnessError> {
        let bound = bound.get();
        // 2^64 mod bound draws at the top of the range are rejected.
        // Zero when bound is a power of two.
        let rejected = (u64::MAX % bound + 1) % bound;
        let zone = u64::MAX - rejected;

        loop {
            let value = self.next_u64()?;
            if value <= zone {
                return Ok(value % bound);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
