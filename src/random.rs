//! Random number generation for simulation runs.
//!
//! Every run owns exactly one generator, created once when the run starts. There is no
//! process-wide generator, so independent runs (including runs on separate threads) cannot
//! disturb each other's draw sequence.

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The generator used by the simulation engine. ChaCha8 produces the same stream on every
/// platform for a given seed.
pub type SimRng = ChaCha8Rng;

/// Creates the generator for one run.
///
/// With no seed a fresh one is drawn from the thread-local generator and logged, so that an
/// interesting run can still be replayed.
#[must_use]
pub fn create_rng(seed: Option<u64>) -> SimRng {
    let seed = seed.unwrap_or_else(|| {
        let seed: u64 = rand::rng().random();
        info!("no random seed configured; using {seed}");
        seed
    });
    SimRng::seed_from_u64(seed)
}
