//! Force of infection.
//!
//! Every bitten person contributes one unit of ambient infection pressure. A susceptible person
//! is bitten during a step with probability `1 - exp(-beta * bitten / population)`.
//!
//! Lockdown enters as a multiplier on `beta` for steps under lockdown. The default multiplier
//! of `1.0` leaves transmission unchanged on lockdown days.

use log::trace;

/// `beta` multiplier that leaves transmission unchanged during lockdown.
pub const NO_LOCKDOWN_EFFECT: f64 = 1.0;

/// Per-susceptible infection probability for one step, clamped to `[0, 1]`.
///
/// Returns `0.0` when the population is empty or nobody is bitten.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn infection_probability(bitten_count: u64, population_size: u64, beta: f64) -> f64 {
    if population_size == 0 || bitten_count == 0 {
        return 0.0;
    }
    let ambient = bitten_count as f64;
    let probability = 1.0 - (-beta * (ambient / population_size as f64)).exp();
    if probability.is_nan() {
        return 0.0;
    }
    probability.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceOfInfection {
    beta: f64,
    lockdown_scale: f64,
}

impl ForceOfInfection {
    #[must_use]
    pub fn new(beta: f64, lockdown_scale: f64) -> Self {
        ForceOfInfection {
            beta,
            lockdown_scale,
        }
    }

    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    #[must_use]
    pub fn lockdown_scale(&self) -> f64 {
        self.lockdown_scale
    }

    /// The transmission intensity in effect on a step.
    #[must_use]
    pub fn effective_beta(&self, locked_down: bool) -> f64 {
        if locked_down {
            self.beta * self.lockdown_scale
        } else {
            self.beta
        }
    }

    #[must_use]
    pub fn infection_probability(
        &self,
        bitten_count: u64,
        population_size: u64,
        locked_down: bool,
    ) -> f64 {
        let beta = self.effective_beta(locked_down);
        let probability = infection_probability(bitten_count, population_size, beta);
        trace!(
            "infection probability {probability} (bitten={bitten_count}, beta={beta}, locked_down={locked_down})"
        );
        probability
    }
}
