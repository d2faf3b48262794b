//! Keyed Hashing for Commitments
//!
//! HMAC-SHA-256 over a 256-bit secret key. A digest published before the key
//! binds its holder to the hashed value; anyone holding the key and value
//! afterwards can recompute and check it.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;

use super::rng::{RandomnessError, SecureRng};

type HmacSha256 = Hmac<Sha256>;

/// Secret key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Digest length in bytes (SHA-256 output).
pub const DIGEST_LEN: usize = 32;

/// Secret HMAC key.
///
/// `Debug` never prints the key bytes. `Display` and serde use hex, which is
/// only meant to be reached once the key is revealed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Wrap raw key bytes.
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Draw a fresh key from the secure RNG.
    pub fn generate<R>(rng: &mut SecureRng<R>) -> Result<Self, RandomnessError>
    where
        R: rand::RngCore + rand::CryptoRng,
    {
        let mut bytes = [0u8; KEY_LEN];
        rng.fill(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Hex encoding (uppercase).
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SecretKey {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Published commitment digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitDigest([u8; DIGEST_LEN]);

impl CommitDigest {
    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Hex encoding (uppercase).
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Debug for CommitDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitDigest({})", self.to_hex())
    }
}

impl fmt::Display for CommitDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for CommitDigest {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_serde!(SecretKey);
hex_serde!(CommitDigest);

/// Canonical message encoding of a committed value.
///
/// Decimal ASCII, so a third party can recompute the digest with any stock
/// HMAC tool (`echo -n 4 | openssl dgst -sha256 -mac HMAC -macopt hexkey:...`).
pub fn encode_value(value: u64) -> Vec<u8> {
    value.to_string().into_bytes()
}

fn mac_for(key: &SecretKey) -> HmacSha256 {
    // HMAC accepts keys of any length, so this cannot fail.
    <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC takes keys of any size"))
}

/// Compute `HMAC-SHA-256(key, message)`.
pub fn keyed_hash(key: &SecretKey, message: &[u8]) -> CommitDigest {
    let mut mac = mac_for(key);
    mac.update(message);
    CommitDigest(mac.finalize().into_bytes().into())
}

/// Check `digest == HMAC-SHA-256(key, message)` in constant time.
pub fn verify_keyed_hash(key: &SecretKey, message: &[u8], digest: &CommitDigest) -> bool {
    let mut mac = mac_for(key);
    mac.update(message);
    mac.verify_slice(digest.as_bytes()).is_ok()
}

// =============================================================================
// TESTS
// =============================================================================
