//! Dice Definitions
//!
//! A die is an immutable multiset of integer faces. Dice are built from
//! comma-separated configuration strings, one per die, numbered from 1 in
//! input order.

use std::fmt;
use std::num::NonZeroU64;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rng::{RandomnessError, SecureRng};

/// Minimum number of dice a game needs.
pub const MIN_DICE: usize = 3;

/// Errors in dice configuration input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    /// Not enough dice configurations supplied.
    #[error("at least {min} dice are required, got {got}")]
    TooFewDice {
        /// Number of configurations supplied.
        got: usize,
        /// Required minimum.
        min: usize,
    },

    /// A configuration had no faces.
    #[error("die {die} has no faces")]
    EmptyDie {
        /// 1-based die id.
        die: usize,
    },

    /// A face was not an integer.
    #[error("die {die}: face {token:?} is not an integer")]
    InvalidFace {
        /// 1-based die id.
        die: usize,
        /// Offending token, as written.
        token: String,
    },
}

/// A single die.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDie")]
pub struct Die {
    id: usize,
    faces: Vec<i64>,
}

/// Unchecked wire form, validated through [`Die::new`].
#[derive(Deserialize)]
struct RawDie {
    id: usize,
    faces: Vec<i64>,
}

impl TryFrom<RawDie> for Die {
    type Error = DiceError;

    fn try_from(raw: RawDie) -> Result<Self, Self::Error> {
        Die::new(raw.id, raw.faces)
    }
}

impl Die {
    /// Create a die from its faces. At least one face is required.
    pub fn new(id: usize, faces: Vec<i64>) -> Result<Self, DiceError> {
        if faces.is_empty() {
            return Err(DiceError::EmptyDie { die: id });
        }
        Ok(Self { id, faces })
    }

    /// 1-based identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Faces in configuration order.
    pub fn faces(&self) -> &[i64] {
        &self.faces
    }

    /// Number of faces (never zero).
    pub fn face_count(&self) -> NonZeroU64 {
        NonZeroU64::new(self.faces.len() as u64)
            .unwrap_or_else(|| unreachable!("dice always have a face"))
    }

    /// Face at `index`, if in range.
    ///
    /// Used to map the result of a fair draw over `[0, face_count)` onto a face.
    pub fn face_at(&self, index: u64) -> Option<i64> {
        usize::try_from(index).ok().and_then(|i| self.faces.get(i)).copied()
    }

    /// Roll the die: a uniformly random face.
    pub fn roll<R>(&self, rng: &mut SecureRng<R>) -> Result<i64, RandomnessError>
    where
        R: RngCore + CryptoRng,
    {
        let index = rng.uniform(self.face_count())?;
        Ok(self.faces[index as usize])
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces: Vec<String> = self.faces.iter().map(|face| face.to_string()).collect();
        write!(f, "[{}]", faces.join(","))
    }
}

/// Parse one die configuration, e.g. `"2,2,4,4,9,9"`.
pub fn parse_die(id: usize, config: &str) -> Result<Die, DiceError> {
    if config.trim().is_empty() {
        return Err(DiceError::EmptyDie { die: id });
    }

    let faces = config
        .split(',')
        .map(|token| {
            token.trim().parse::<i64>().map_err(|_| DiceError::InvalidFace {
                die: id,
                token: token.trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Die::new(id, faces)
}

/// Parse a full set of dice configurations.
///
/// Fails before building anything if fewer than [`MIN_DICE`] configurations
/// are supplied. Any invalid configuration rejects the whole set.
pub fn parse_dice<S: AsRef<str>>(configs: &[S]) -> Result<Vec<Die>, DiceError> {
    if configs.len() < MIN_DICE {
        return Err(DiceError::TooFewDice {
            got: configs.len(),
            min: MIN_DICE,
        });
    }

    configs
        .iter()
        .enumerate()
        .map(|(i, config)| parse_die(i + 1, config.as_ref()))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::tests::{seeded, FailingRng};

    #[test]
    fn test_parse_dice() {
        let dice = parse_dice(&["2,2,4,4,9,9", "1,1,6,6,8,8", "3,3,5,5,7,7"]).unwrap();

        assert_eq!(dice.len(), 3);
        assert_eq!(dice[0].id(), 1);
        assert_eq!(dice[2].id(), 3);
        assert_eq!(dice[1].faces(), &[1, 1, 6, 6, 8, 8]);
    }

    #[test]
    fn test_parse_trims_and_allows_negatives() {
        let die = parse_die(1, " -1, 0 ,7").unwrap();
        assert_eq!(die.faces(), &[-1, 0, 7]);
    }

    #[test]
    fn test_too_few_dice() {
        let err = parse_dice(&["1,2,3", "4,5,6"]).unwrap_err();
        assert_eq!(err, DiceError::TooFewDice { got: 2, min: 3 });
    }

    #[test]
    fn test_invalid_face() {
        let err = parse_dice(&["1,2,3", "1,x,3", "4,5,6"]).unwrap_err();
        assert_eq!(
            err,
            DiceError::InvalidFace { die: 2, token: "x".to_string() }
        );
    }

    #[test]
    fn test_empty_faces() {
        assert_eq!(parse_die(4, "  "), Err(DiceError::EmptyDie { die: 4 }));
        assert_eq!(Die::new(1, vec![]), Err(DiceError::EmptyDie { die: 1 }));
        // Trailing comma leaves an empty token.
        assert!(matches!(parse_die(1, "1,2,"), Err(DiceError::InvalidFace { .. })));
    }

    #[test]
    fn test_roll_returns_faces() {
        let die = parse_die(1, "2,2,4,4,9,9").unwrap();
        let mut rng = seeded(5);

        for _ in 0..500 {
            let face = die.roll(&mut rng).unwrap();
            assert!(die.faces().contains(&face));
        }
    }

    #[test]
    fn test_roll_is_unbiased() {
        // 5 faces do not divide a power of two. 50k rolls, 10k expected per
        // face, sigma ~89.
        let die = Die::new(1, vec![1, 2, 3, 4, 5]).unwrap();
        let mut rng = seeded(2024);
        let mut counts = [0u32; 5];
        let rolls = 50_000;

        for _ in 0..rolls {
            counts[(die.roll(&mut rng).unwrap() - 1) as usize] += 1;
        }

        let expected = rolls as f64 / 5.0;
        let sigma = (rolls as f64 * 0.2 * 0.8).sqrt();
        for count in counts {
            assert!((count as f64 - expected).abs() < 5.0 * sigma);
        }
    }

    #[test]
    fn test_single_face_die() {
        let die = Die::new(1, vec![42]).unwrap();
        let mut rng = seeded(0);
        assert_eq!(die.roll(&mut rng).unwrap(), 42);
    }

    #[test]
    fn test_face_at() {
        let die = parse_die(1, "3,3,5,5,7,7").unwrap();
        assert_eq!(die.face_at(0), Some(3));
        assert_eq!(die.face_at(5), Some(7));
        assert_eq!(die.face_at(6), None);
        assert_eq!(die.face_count().get(), 6);
    }

    #[test]
    fn test_roll_failure_propagates() {
        let die = Die::new(1, vec![1, 2, 3]).unwrap();
        let mut rng = SecureRng::from_rng(FailingRng);
        assert!(die.roll(&mut rng).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let die: Die = serde_json::from_str(r#"{"id":2,"faces":[1,6]}"#).unwrap();
        assert_eq!(die.faces(), &[1, 6]);

        assert!(serde_json::from_str::<Die>(r#"{"id":2,"faces":[]}"#).is_err());
    }

    #[test]
    fn test_display() {
        let die = parse_die(1, "1,1,6,6,8,8").unwrap();
        assert_eq!(die.to_string(), "[1,1,6,6,8,8]");
    }
}
