//! Simulation configuration.
//!
//! A [`SimulationConfig`] can be built in code with [`SimulationConfigBuilder`], whose defaults
//! describe a 50 person outbreak over 30 days, or loaded from a JSON file:
//!
//! ```json
//! {
//!     "population_size": 50,
//!     "days": 30,
//!     "beta": 0.45,
//!     "p_normal_to_bitten": 0.10,
//!     "p_bitten_to_dead": 0.099,
//!     "p_dead_to_zombie": 0.07,
//!     "prop_normal": 0.92,
//!     "prop_bitten": 0.08,
//!     "prop_dead": 0.0,
//!     "prop_zombie": 0.0,
//!     "seed": 42,
//!     "lockdown": { "weekdays": ["monday", "thursday", "saturday"], "beta_scale": 0.5 }
//! }
//! ```
//!
//! `seed` and `lockdown` may be omitted. Without a seed every run is different.

use std::fs;
use std::path::Path;

use derive_builder::Builder;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::numeric::{is_probability, sums_to_one};
use crate::policy::{weekly_lockdown, PolicySet, Weekday};
use crate::state::PopulationState;
use crate::transmission::{ForceOfInfection, NO_LOCKDOWN_EFFECT};

fn default_lockdown_weekdays() -> Vec<Weekday> {
    vec![Weekday::Monday, Weekday::Thursday, Weekday::Saturday]
}

fn default_beta_scale() -> f64 {
    NO_LOCKDOWN_EFFECT
}

/// When lockdown is in force and how strongly it suppresses transmission.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LockdownParameters {
    #[serde(default = "default_lockdown_weekdays")]
    pub weekdays: Vec<Weekday>,

    /// Multiplier applied to `beta` on lockdown days.
    #[serde(default = "default_beta_scale")]
    pub beta_scale: f64,
}

impl Default for LockdownParameters {
    fn default() -> Self {
        LockdownParameters {
            weekdays: default_lockdown_weekdays(),
            beta_scale: default_beta_scale(),
        }
    }
}

impl LockdownParameters {
    /// The policy described by these parameters. Empty when no weekdays are configured.
    #[must_use]
    pub fn policy_set(&self) -> PolicySet {
        if self.weekdays.is_empty() {
            return PolicySet::new();
        }
        PolicySet::new().with_rule(weekly_lockdown(&self.weekdays))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[builder(build_fn(error = "SimError"))]
pub struct SimulationConfig {
    #[builder(default = "50")]
    pub population_size: u64,

    #[builder(default = "30")]
    pub days: u64,

    /// Transmission intensity.
    #[builder(default = "0.45")]
    pub beta: f64,

    /// Carried for completeness; infections are driven by the force of infection instead.
    #[builder(default = "0.10")]
    pub p_normal_to_bitten: f64,

    #[builder(default = "0.099")]
    pub p_bitten_to_dead: f64,

    #[builder(default = "0.07")]
    pub p_dead_to_zombie: f64,

    #[builder(default = "0.92")]
    pub prop_normal: f64,

    #[builder(default = "0.08")]
    pub prop_bitten: f64,

    #[builder(default = "0.0")]
    pub prop_dead: f64,

    #[builder(default = "0.0")]
    pub prop_zombie: f64,

    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub seed: Option<u64>,

    #[builder(default)]
    #[serde(default)]
    pub lockdown: LockdownParameters,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            population_size: 50,
            days: 30,
            beta: 0.45,
            p_normal_to_bitten: 0.10,
            p_bitten_to_dead: 0.099,
            p_dead_to_zombie: 0.07,
            prop_normal: 0.92,
            prop_bitten: 0.08,
            prop_dead: 0.0,
            prop_zombie: 0.0,
            seed: None,
            lockdown: LockdownParameters::default(),
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), SimError> {
    if is_probability(value) {
        Ok(())
    } else {
        Err(SimError::ConfigurationError(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Reads and validates a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `SimError` if the file cannot be read or parsed, or the parameters are invalid.
    pub fn load_from_json(file_path: &Path) -> Result<SimulationConfig, SimError> {
        trace!("loading simulation config from {}", file_path.display());
        let contents = fs::read_to_string(file_path)?;
        let config: SimulationConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every invariant a run relies on.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ConfigurationError` naming the first offending parameter.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.population_size == 0 {
            return Err(SimError::ConfigurationError(
                "population_size must be positive".to_string(),
            ));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(SimError::ConfigurationError(format!(
                "beta must be a non-negative number, got {}",
                self.beta
            )));
        }
        check_probability("p_normal_to_bitten", self.p_normal_to_bitten)?;
        check_probability("p_bitten_to_dead", self.p_bitten_to_dead)?;
        check_probability("p_dead_to_zombie", self.p_dead_to_zombie)?;

        let proportions = self.proportions();
        for (name, value) in ["prop_normal", "prop_bitten", "prop_dead", "prop_zombie"]
            .into_iter()
            .zip(proportions)
        {
            check_probability(name, value)?;
        }
        if !sums_to_one(&proportions) {
            return Err(SimError::ConfigurationError(format!(
                "initial proportions must sum to 1, got {}",
                proportions.iter().sum::<f64>()
            )));
        }

        check_probability("lockdown.beta_scale", self.lockdown.beta_scale)?;
        Ok(())
    }

    /// `[normal, bitten, dead, zombie]`
    #[must_use]
    pub fn proportions(&self) -> [f64; 4] {
        [
            self.prop_normal,
            self.prop_bitten,
            self.prop_dead,
            self.prop_zombie,
        ]
    }

    /// The day 0 state. Only the bitten proportion is used: everyone not bitten starts out
    /// normal, and nobody starts dead or a zombie.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn initial_state(&self) -> PopulationState {
        if self.prop_dead > 0.0 || self.prop_zombie > 0.0 {
            warn!(
                "prop_dead={} and prop_zombie={} are ignored; day 0 only holds normal and bitten people",
                self.prop_dead, self.prop_zombie
            );
        }
        let bitten = ((self.population_size as f64 * self.prop_bitten).round() as u64)
            .min(self.population_size);
        PopulationState::new(self.population_size - bitten, bitten, 0, 0)
    }

    #[must_use]
    pub fn force_of_infection(&self) -> ForceOfInfection {
        ForceOfInfection::new(self.beta, self.lockdown.beta_scale)
    }
}
