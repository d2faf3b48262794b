//! Provably Fair Generation
//!
//! Commit-reveal protocol for agreeing on a random integer between two
//! parties, plus the material a third party needs to audit a round.
//!
//! ## Round
//!
//! ```text
//! committer                          chooser
//! ─────────                          ───────
//! commit(range) ──── digest ───────▶
//!               ◀─── chosen value ── pick in [0, range)
//! reveal(chosen) ─── key, value ───▶ verify(digest, key, value)
//!            result = (value + chosen) mod range
//! ```

pub mod commitment;

pub use commitment::{
    FairRandomProtocol, Commitment, Reveal, ProtocolError, verify, combine,
};
