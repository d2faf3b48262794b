//! # Fair Dice
//!
//! Provably fair two-party random generation and a Monte-Carlo estimator
//! for comparing dice with arbitrary integer faces.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         FAIR DICE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Cryptographic primitives                  │
//! │  ├── rng.rs      - OS-backed RNG, bias-free uniform ints     │
//! │  └── hash.rs     - HMAC-SHA-256 keys and digests             │
//! │                                                              │
//! │  game/           - Dice and analysis                         │
//! │  ├── die.rs      - Die type and configuration parsing        │
//! │  └── probability.rs - Pairwise win-probability matrix        │
//! │                                                              │
//! │  proof/          - Provable fairness                         │
//! │  └── commitment.rs - Commit, reveal, verify, combine         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fairness Guarantee
//!
//! - All randomness comes from one bias-free primitive over OS entropy
//! - A committed value is fixed by its digest before the chooser picks
//! - Key and value can only be revealed by supplying the chooser's value
//! - The library performs no I/O and no logging

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod proof;

// Re-export commonly used types
pub use crate::core::rng::{SecureRng, RandomnessError};
pub use crate::core::hash::{SecretKey, CommitDigest};
pub use crate::game::die::{Die, DiceError, parse_dice};
pub use crate::game::probability::{ProbabilityEstimator, ProbabilityMatrix, EstimatorConfig};
pub use crate::proof::commitment::{FairRandomProtocol, Commitment, Reveal, ProtocolError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
