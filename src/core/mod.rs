//! Core cryptographic primitives.
//!
//! Everything random or hashed in the crate goes through this module.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::{SecureRng, RandomnessError};
pub use hash::{SecretKey, CommitDigest, keyed_hash, verify_keyed_hash, encode_value};
