//! Fair Dice
//!
//! Demonstration driver. Takes dice configurations as arguments, prints the
//! win-probability matrix, then plays one provably fair round.
//!
//! ```text
//! fair-dice 2,2,4,4,9,9 1,1,6,6,8,8 3,3,5,5,7,7
//! ```

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fair_dice::{
    VERSION,
    core::rng::SecureRng,
    game::{die::parse_dice, probability::{EstimatorConfig, ProbabilityEstimator}, Die},
    proof::commitment::{FairRandomProtocol, Reveal},
};

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Fair Dice v{}", VERSION);

    let configs: Vec<String> = std::env::args().skip(1).collect();
    let dice = parse_dice(&configs).context("invalid dice configuration")?;
    for die in &dice {
        info!("Die {}: {}", die.id(), die);
    }

    let config = EstimatorConfig::from_env();
    info!("Estimating win probabilities ({} trials per pair)", config.trials);

    let mut rng = SecureRng::new();
    let matrix = ProbabilityEstimator::new(config)
        .estimate_matrix(&dice, &mut rng)
        .context("probability estimation failed")?;
    println!("{}", matrix);

    play_round(&dice)
}

/// One fair round: decide who moves first, then throw both dice fairly.
fn play_round(dice: &[Die]) -> Result<()> {
    // Separate entropy handles stand in for the two parties.
    let mut committer = SecureRng::new();
    let mut chooser = SecureRng::new();

    info!("=== Deciding first move ===");
    let first = fair_draw(FairRandomProtocol::new(2)?, &mut committer, &mut chooser)?;
    let committer_first = first.result == 0;
    info!("{} moves first", if committer_first { "Committer" } else { "Chooser" });

    let (committer_die, chooser_die) = if committer_first {
        (&dice[0], &dice[1])
    } else {
        (&dice[1], &dice[0])
    };

    info!("=== Committer throws die {} ===", committer_die.id());
    let committer_face = fair_throw(committer_die, &mut committer, &mut chooser)?;

    info!("=== Chooser throws die {} ===", chooser_die.id());
    let chooser_face = fair_throw(chooser_die, &mut committer, &mut chooser)?;

    match committer_face.cmp(&chooser_face) {
        std::cmp::Ordering::Greater => info!("Committer wins ({} > {})", committer_face, chooser_face),
        std::cmp::Ordering::Less => info!("Chooser wins ({} < {})", committer_face, chooser_face),
        std::cmp::Ordering::Equal => info!("Tie ({} = {})", committer_face, chooser_face),
    }

    Ok(())
}

/// Throw `die` through the protocol and return the agreed face.
fn fair_throw(die: &Die, committer: &mut SecureRng, chooser: &mut SecureRng) -> Result<i64> {
    let reveal = fair_draw(FairRandomProtocol::for_die(die), committer, chooser)?;
    die.face_at(reveal.result)
        .with_context(|| format!("result {} is not a face index of die {}", reveal.result, die.id()))
}

/// Run the commit, choose, reveal, verify sequence.
fn fair_draw(
    protocol: FairRandomProtocol,
    committer: &mut SecureRng,
    chooser: &mut SecureRng,
) -> Result<Reveal> {
    let commitment = protocol.commit(committer).context("commit failed")?;
    info!("Commitment (HMAC): {}", commitment.digest());

    let chosen = chooser.uniform(protocol.range_bound())?;
    info!("Chooser picks {} in [0, {})", chosen, protocol.range());

    let reveal = commitment.reveal(chosen).map_err(|(_, err)| err)?;
    info!("Committer value: {}, key: {}", reveal.committed_value, reveal.key);

    if let Err(err) = reveal.verify() {
        warn!("Round failed verification: {}", err);
        bail!(err);
    }
    info!("Result: ({} + {}) mod {} = {}", reveal.committed_value, reveal.chosen_value, reveal.range, reveal.result);
    debug!("Audit record: {}", serde_json::to_string(&reveal)?);

    Ok(reveal)
}
