//! Per-trial random streams.
//!
//! Every stochastic draw of a Monte-Carlo trial goes through the stream
//! returned here. Streams are derived from `(base_seed, trial_index)` only,
//! so a trial replays identically regardless of how many trials run or in
//! which order workers pick them up.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

pub fn trial_seed(base_seed: u64, trial_index: u64) -> u64 {
    base_seed ^ trial_index.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA)
}

pub fn trial_rng(base_seed: u64, trial_index: u64) -> Pcg64Mcg {
    Pcg64Mcg::seed_from_u64(trial_seed(base_seed, trial_index))
}
