//! Fair Random Commitment Protocol
//!
//! Two parties agree on an integer in `[0, range)` that neither can bias:
//!
//! 1. The committer draws a secret value and key and publishes only the
//!    keyed digest ([`FairRandomProtocol::commit`], [`Commitment::digest`]).
//! 2. The chooser picks their own value in `[0, range)`.
//! 3. The committer reveals key and value ([`Commitment::reveal`]), which
//!    is only possible by handing over the chooser's value.
//! 4. The chooser checks the digest ([`Reveal::verify`]) and both accept
//!    `(committed + chosen) mod range` ([`combine`]).

use std::fmt;
use std::num::NonZeroU64;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hash::{encode_value, keyed_hash, verify_keyed_hash, CommitDigest, SecretKey};
use crate::core::rng::{RandomnessError, SecureRng};
use crate::game::die::Die;

/// Errors raised by the fair random protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Range must be at least 1.
    #[error("range must be a positive integer, got {0}")]
    InvalidRange(u64),

    /// Chooser's value is outside `[0, range)`.
    #[error("chosen value {value} is outside [0, {range})")]
    ChoiceOutOfRange {
        /// Supplied value.
        value: u64,
        /// Protocol range.
        range: u64,
    },

    /// Committed value is outside `[0, range)`.
    #[error("committed value {value} is outside [0, {range})")]
    CommittedOutOfRange {
        /// Claimed committed value.
        value: u64,
        /// Protocol range.
        range: u64,
    },

    /// Revealed key and value do not reproduce the published digest.
    #[error("commitment verification failed: digest does not match revealed key and value")]
    VerificationFailed,

    /// Published result is not the combination of the revealed values.
    #[error("result mismatch: expected {expected}, got {got}")]
    ResultMismatch {
        /// Result recomputed from the revealed values.
        expected: u64,
        /// Result that was published.
        got: u64,
    },

    /// Secure randomness source failed.
    #[error(transparent)]
    Randomness(#[from] RandomnessError),
}

impl ProtocolError {
    /// True for outcomes that indicate a dishonest or broken committer,
    /// as opposed to a malformed request.
    pub fn is_trust_violation(&self) -> bool {
        matches!(self, Self::VerificationFailed | Self::ResultMismatch { .. })
    }
}

fn check_range(range: u64) -> Result<NonZeroU64, ProtocolError> {
    NonZeroU64::new(range).ok_or(ProtocolError::InvalidRange(range))
}

/// Check that `key` and `committed_value` reproduce `digest`.
///
/// Comparison is constant time.
pub fn verify(digest: &CommitDigest, key: &SecretKey, committed_value: u64) -> bool {
    verify_keyed_hash(key, &encode_value(committed_value), digest)
}

/// The fair result: `(committed_value + chosen_value) mod range`.
///
/// Both values must lie in `[0, range)`. Out-of-range values are rejected,
/// never wrapped.
pub fn combine(committed_value: u64, chosen_value: u64, range: u64) -> Result<u64, ProtocolError> {
    let bound = check_range(range)?;

    if committed_value >= range {
        return Err(ProtocolError::CommittedOutOfRange {
            value: committed_value,
            range,
        });
    }
    if chosen_value >= range {
        return Err(ProtocolError::ChoiceOutOfRange {
            value: chosen_value,
            range,
        });
    }

    let sum = committed_value as u128 + chosen_value as u128;
    Ok((sum % bound.get() as u128) as u64)
}

/// Protocol instance for a fixed range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FairRandomProtocol {
    range: NonZeroU64,
}

impl FairRandomProtocol {
    /// Create a protocol over `[0, range)`. Rejects `range == 0`.
    pub fn new(range: u64) -> Result<Self, ProtocolError> {
        Ok(Self {
            range: check_range(range)?,
        })
    }

    /// Protocol over the face indices of `die`.
    ///
    /// The combined result is a face index, see [`Die::face_at`].
    pub fn for_die(die: &Die) -> Self {
        Self {
            range: die.face_count(),
        }
    }

    /// Protocol range.
    pub fn range(&self) -> u64 {
        self.range.get()
    }

    /// Protocol range as a sampling bound.
    pub fn range_bound(&self) -> NonZeroU64 {
        self.range
    }

    /// Draw a fresh key and value and seal them behind a digest.
    ///
    /// A new key is generated on every call.
    pub fn commit<R>(&self, rng: &mut SecureRng<R>) -> Result<Commitment, ProtocolError>
    where
        R: RngCore + CryptoRng,
    {
        let key = SecretKey::generate(rng)?;
        let committed_value = rng.uniform(self.range)?;
        Ok(Commitment::seal(key, committed_value, self.range))
    }

    /// Check that `chosen_value` is an acceptable choice.
    pub fn validate_choice(&self, chosen_value: u64) -> Result<u64, ProtocolError> {
        if chosen_value >= self.range.get() {
            return Err(ProtocolError::ChoiceOutOfRange {
                value: chosen_value,
                range: self.range.get(),
            });
        }
        Ok(chosen_value)
    }
}

/// A sealed commitment held by the committer.
///
/// Only the digest is readable. Key and value come out through
/// [`Commitment::reveal`], which requires the chooser's value.
pub struct Commitment {
    key: SecretKey,
    committed_value: u64,
    range: NonZeroU64,
    digest: CommitDigest,
}

impl Commitment {
    fn seal(key: SecretKey, committed_value: u64, range: NonZeroU64) -> Self {
        let digest = keyed_hash(&key, &encode_value(committed_value));
        Self {
            key,
            committed_value,
            range,
            digest,
        }
    }

    /// Rebuild a commitment from known parts.
    pub fn from_parts(key: SecretKey, committed_value: u64, range: u64) -> Result<Self, ProtocolError> {
        let bound = check_range(range)?;
        if committed_value >= range {
            return Err(ProtocolError::CommittedOutOfRange {
                value: committed_value,
                range,
            });
        }
        Ok(Self::seal(key, committed_value, bound))
    }

    /// Digest to publish before the chooser picks.
    pub fn digest(&self) -> &CommitDigest {
        &self.digest
    }

    /// Protocol range.
    pub fn range(&self) -> u64 {
        self.range.get()
    }

    /// Open the commitment against the chooser's value.
    ///
    /// On an out-of-range choice the commitment is handed back unopened,
    /// so the round can continue with a corrected choice.
    pub fn reveal(self, chosen_value: u64) -> Result<Reveal, (Self, ProtocolError)> {
        let result = match combine(self.committed_value, chosen_value, self.range.get()) {
            Ok(result) => result,
            Err(err) => return Err((self, err)),
        };

        Ok(Reveal {
            range: self.range.get(),
            digest: self.digest,
            key: self.key,
            committed_value: self.committed_value,
            chosen_value,
            result,
        })
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commitment")
            .field("range", &self.range)
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

/// Everything a third party needs to audit one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    /// Protocol range.
    pub range: u64,
    /// Digest published before the chooser picked.
    pub digest: CommitDigest,
    /// Committer's key.
    pub key: SecretKey,
    /// Committer's value.
    pub committed_value: u64,
    /// Chooser's value.
    pub chosen_value: u64,
    /// Agreed result.
    pub result: u64,
}

impl Reveal {
    /// Re-check the whole round.
    ///
    /// Fails with [`ProtocolError::VerificationFailed`] if the digest does not
    /// match, and with [`ProtocolError::ResultMismatch`] if the published result
    /// is not the combination of the two values.
    pub fn verify(&self) -> Result<(), ProtocolError> {
        if !verify(&self.digest, &self.key, self.committed_value) {
            return Err(ProtocolError::VerificationFailed);
        }

        let expected = combine(self.committed_value, self.chosen_value, self.range)?;
        if expected != self.result {
            return Err(ProtocolError::ResultMismatch {
                expected,
                got: self.result,
            });
        }

        Ok(())
    }
}
