//! Drawing the number of people who change compartment during a step.

use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Draws how many of `count` people transition, each independently with `probability`.
///
/// Implementations must return a value no greater than `count`, return `0` for an empty
/// compartment without consuming randomness, and be deterministic given the state of `rng`.
pub trait TransitionSampler {
    fn sample<R: Rng + ?Sized>(&self, count: u64, probability: f64, rng: &mut R) -> u64;
}

/// Samples from `Binomial(count, probability)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinomialSampler;

impl TransitionSampler for BinomialSampler {
    fn sample<R: Rng + ?Sized>(&self, count: u64, probability: f64, rng: &mut R) -> u64 {
        if count == 0 {
            return 0;
        }
        // Probabilities are validated upstream; NaN collapses to "nobody moves".
        let p = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Binomial::new(count, p).map_or(0, |binomial| binomial.sample(rng))
    }
}

/// Moves `round(count * probability)` people. Consumes no randomness, which makes trajectories
/// computable by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedValueSampler;

impl TransitionSampler for ExpectedValueSampler {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn sample<R: Rng + ?Sized>(&self, count: u64, probability: f64, _rng: &mut R) -> u64 {
        if count == 0 || probability.is_nan() {
            return 0;
        }
        let expected = (count as f64 * probability.clamp(0.0, 1.0)).round() as u64;
        expected.min(count)
    }
}
