//! Game-facing types: dice and the relative-strength estimator.

pub mod die;
pub mod probability;

pub use die::{Die, DiceError, parse_die, parse_dice, MIN_DICE};
pub use probability::{
    ProbabilityEstimator, ProbabilityMatrix, EstimatorConfig, MatchupTally,
    simulate, tally, DEFAULT_TRIALS, SELF_MATCHUP,
};
