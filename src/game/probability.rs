//! Relative Strength Estimation
//!
//! Monte-Carlo estimate of `P(A beats B)` for every ordered pair of dice.
//! Results are sampling estimates: repeated runs differ by noise.

use std::fmt;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::core::rng::{RandomnessError, SecureRng};
use crate::game::die::Die;

/// Default number of trials per ordered pair.
pub const DEFAULT_TRIALS: u32 = 10_000;

/// Value placed on the matrix diagonal. A die never plays itself.
pub const SELF_MATCHUP: f64 = 0.5;

/// Estimator configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Trials per ordered pair. Larger counts tighten the estimate at linear cost.
    pub trials: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
        }
    }
}

impl EstimatorConfig {
    /// Create config from environment variables.
    ///
    /// `FAIR_DICE_TRIALS` overrides the trial count. Zero or unparsable
    /// values keep the default.
    pub fn from_env() -> Self {
        let value = std::env::var("FAIR_DICE_TRIALS").ok();
        Self {
            trials: parse_trials(value.as_deref()),
        }
    }
}

/// Trial count from an optional setting, falling back to [`DEFAULT_TRIALS`].
fn parse_trials(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&t| t > 0)
        .unwrap_or(DEFAULT_TRIALS)
}

/// Outcome counts for one die against another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupTally {
    /// Trials where the first die rolled strictly higher.
    pub wins: u32,
    /// Trials with equal rolls.
    pub ties: u32,
    /// Trials where the second die rolled strictly higher.
    pub losses: u32,
}

impl MatchupTally {
    /// Total trials recorded.
    pub fn trials(&self) -> u32 {
        self.wins + self.ties + self.losses
    }

    /// Fraction of trials won. Zero when no trials were run.
    pub fn win_rate(&self) -> f64 {
        match self.trials() {
            0 => 0.0,
            n => self.wins as f64 / n as f64,
        }
    }
}

/// Roll `a` against `b` `trials` times and count every outcome.
pub fn tally<R>(
    a: &Die,
    b: &Die,
    trials: u32,
    rng: &mut SecureRng<R>,
) -> Result<MatchupTally, RandomnessError>
where
    R: RngCore + CryptoRng,
{
    let mut tally = MatchupTally::default();

    for _ in 0..trials {
        let roll_a = a.roll(rng)?;
        let roll_b = b.roll(rng)?;

        match roll_a.cmp(&roll_b) {
            std::cmp::Ordering::Greater => tally.wins += 1,
            std::cmp::Ordering::Equal => tally.ties += 1,
            std::cmp::Ordering::Less => tally.losses += 1,
        }
    }

    Ok(tally)
}

/// Roll `a` against `b` `trials` times and count strict wins for `a`.
pub fn simulate<R>(
    a: &Die,
    b: &Die,
    trials: u32,
    rng: &mut SecureRng<R>,
) -> Result<u32, RandomnessError>
where
    R: RngCore + CryptoRng,
{
    Ok(tally(a, b, trials, rng)?.wins)
}

/// Square matrix of estimated win probabilities.
///
/// `get(i, j)` is the estimated probability that die `i` beats die `j`,
/// indexed by position in the input slice. Rows and columns are labelled by
/// die id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityMatrix {
    ids: Vec<usize>,
    cells: Vec<Vec<f64>>,
}

impl ProbabilityMatrix {
    /// Die ids labelling rows and columns.
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Number of dice.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if built from no dice.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Estimated `P(die i beats die j)`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells.get(i).and_then(|row| row.get(j)).copied()
    }
}

impl fmt::Display for ProbabilityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const CELL: usize = 9;

        write!(f, "{:>width$}", "A \\ B", width = CELL)?;
        for id in &self.ids {
            write!(f, " | {:>width$}", format!("die {}", id), width = CELL)?;
        }
        writeln!(f)?;

        let rule = "-".repeat(CELL + self.ids.len() * (CELL + 3));
        writeln!(f, "{}", rule)?;

        for (id, row) in self.ids.iter().zip(&self.cells) {
            write!(f, "{:>width$}", format!("die {}", id), width = CELL)?;
            for p in row {
                write!(f, " | {:>width$.2}%", p * 100.0, width = CELL - 1)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Pairwise win-probability estimator.
#[derive(Clone, Debug, Default)]
pub struct ProbabilityEstimator {
    config: EstimatorConfig,
}

impl ProbabilityEstimator {
    /// Create an estimator with the given configuration.
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Trials run per ordered pair.
    pub fn trials(&self) -> u32 {
        self.config.trials
    }

    /// Estimate `P(dice[i] beats dice[j])` for every ordered pair `i != j`.
    ///
    /// The diagonal is fixed at [`SELF_MATCHUP`] without simulation.
    pub fn estimate_matrix<R>(
        &self,
        dice: &[Die],
        rng: &mut SecureRng<R>,
    ) -> Result<ProbabilityMatrix, RandomnessError>
    where
        R: RngCore + CryptoRng,
    {
        let trials = self.config.trials;
        let mut cells = vec![vec![SELF_MATCHUP; dice.len()]; dice.len()];

        for (i, a) in dice.iter().enumerate() {
            for (j, b) in dice.iter().enumerate() {
                if i == j {
                    continue;
                }
                cells[i][j] = tally(a, b, trials, rng)?.win_rate();
            }
        }

        Ok(ProbabilityMatrix {
            ids: dice.iter().map(Die::id).collect(),
            cells,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::tests::{seeded, FailingRng};
    use crate::game::die::parse_dice;

    fn efron() -> Vec<Die> {
        parse_dice(&["2,2,4,4,9,9", "1,1,6,6,8,8", "3,3,5,5,7,7"]).unwrap()
    }

    #[test]
    fn test_non_transitive_cycle() {
        // Exact value is 5/9 for each edge of the cycle. At 10k trials
        // sigma is ~0.005.
        let dice = efron();
        let mut rng = seeded(31337);
        let matrix = ProbabilityEstimator::default()
            .estimate_matrix(&dice, &mut rng)
            .unwrap();

        let a_beats_b = matrix.get(0, 1).unwrap();
        let b_beats_c = matrix.get(1, 2).unwrap();
        let c_beats_a = matrix.get(2, 0).unwrap();

        for p in [a_beats_b, b_beats_c, c_beats_a] {
            assert!((p - 5.0 / 9.0).abs() < 0.025, "edge probability {}", p);
        }

        assert!(a_beats_b > matrix.get(1, 0).unwrap());
        assert!(b_beats_c > matrix.get(2, 1).unwrap());
        assert!(c_beats_a > matrix.get(0, 2).unwrap());
    }

    #[test]
    fn test_diagonal_fixed() {
        let dice = efron();
        let mut rng = seeded(1);
        let estimator = ProbabilityEstimator::new(EstimatorConfig { trials: 100 });
        let matrix = estimator.estimate_matrix(&dice, &mut rng).unwrap();

        for i in 0..matrix.len() {
            assert_eq!(matrix.get(i, i), Some(SELF_MATCHUP));
        }
    }

    #[test]
    fn test_symmetry() {
        // Efron dice share no face values, so there are no ties and
        // P(i beats j) + P(j beats i) should be close to 1.
        let dice = efron();
        let mut rng = seeded(77);
        let matrix = ProbabilityEstimator::default()
            .estimate_matrix(&dice, &mut rng)
            .unwrap();

        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    let sum = matrix.get(i, j).unwrap() + matrix.get(j, i).unwrap();
                    assert!((sum - 1.0).abs() < 0.04, "P({},{}) + P({},{}) = {}", i, j, j, i, sum);
                }
            }
        }
    }

    #[test]
    fn test_matrix_shape_and_bounds() {
        let dice = parse_dice(&["1,2,3", "4,5,6", "1,1,1", "6,6,6"]).unwrap();
        let mut rng = seeded(3);
        let matrix = ProbabilityEstimator::new(EstimatorConfig { trials: 500 })
            .estimate_matrix(&dice, &mut rng)
            .unwrap();

        assert_eq!(matrix.ids(), &[1, 2, 3, 4]);
        assert_eq!(matrix.len(), 4);
        for i in 0..4 {
            for j in 0..4 {
                let p = matrix.get(i, j).unwrap();
                assert!((0.0..=1.0).contains(&p));
            }
        }

        // [4,5,6] always beats [1,2,3]; [1,1,1] never beats [6,6,6].
        assert_eq!(matrix.get(1, 0), Some(1.0));
        assert_eq!(matrix.get(2, 3), Some(0.0));
        assert_eq!(matrix.get(4, 0), None);
    }

    #[test]
    fn test_tally_counts_ties() {
        let dice = parse_dice(&["3,3", "3,3", "1"]).unwrap();
        let mut rng = seeded(8);

        let tally = tally(&dice[0], &dice[1], 250, &mut rng).unwrap();
        assert_eq!(tally, MatchupTally { wins: 0, ties: 250, losses: 0 });
        assert_eq!(tally.trials(), 250);
        assert_eq!(tally.win_rate(), 0.0);

        let wins = simulate(&dice[0], &dice[2], 250, &mut rng).unwrap();
        assert_eq!(wins, 250);
    }

    #[test]
    fn test_tally_sums_to_trials() {
        let dice = efron();
        let mut rng = seeded(12);
        let tally = tally(&dice[0], &dice[2], 1000, &mut rng).unwrap();
        assert_eq!(tally.trials(), 1000);
    }

    #[test]
    fn test_randomness_failure_aborts() {
        let dice = efron();
        let mut rng = SecureRng::from_rng(FailingRng);
        assert!(ProbabilityEstimator::default()
            .estimate_matrix(&dice, &mut rng)
            .is_err());
    }

    #[test]
    fn test_render() {
        let dice = efron();
        let mut rng = seeded(4);
        let matrix = ProbabilityEstimator::new(EstimatorConfig { trials: 10 })
            .estimate_matrix(&dice, &mut rng)
            .unwrap();

        let rendered = matrix.to_string();
        assert!(rendered.contains("die 1"));
        assert!(rendered.contains("die 3"));
        assert!(rendered.contains("50.00%"));
        // Header, rule, one row per die.
        assert_eq!(rendered.lines().count(), 2 + dice.len());
    }

    #[test]
    fn test_trials_setting_fallback() {
        assert_eq!(parse_trials(None), DEFAULT_TRIALS);
        assert_eq!(parse_trials(Some("0")), DEFAULT_TRIALS);
        assert_eq!(parse_trials(Some("lots")), DEFAULT_TRIALS);
        assert_eq!(parse_trials(Some("-5")), DEFAULT_TRIALS);
        assert_eq!(parse_trials(Some("")), DEFAULT_TRIALS);
        assert_eq!(parse_trials(Some(" 2500 ")), 2500);
    }

    #[test]
    fn test_config_default() {
        assert_eq!(EstimatorConfig::default().trials, DEFAULT_TRIALS);
        assert_eq!(ProbabilityEstimator::default().trials(), 10_000);
    }
}
