//! A discrete-time stochastic compartmental simulator.
//!
//! A closed population moves through four mutually exclusive compartments: normal, bitten,
//! dead and zombie. Each day:
//! * normal people are bitten with a probability that grows with the number of bitten people
//!   (the force of infection),
//! * bitten people die with a fixed probability,
//! * dead people rise as zombies with a fixed probability.
//!
//! All transitions are binomial draws. A calendar based lockdown policy decides which days are
//! under lockdown, and lockdown can scale down transmission.
//!
//! The crate is organized as:
//! * [`policy`]: lockdown rules and rule sets,
//! * [`transmission`]: the force of infection,
//! * [`sampling`]: drawing transition counts,
//! * [`engine`]: the day by day state machine that owns a run,
//! * [`parameters`]: configuration and its validation,
//! * [`report`]: CSV output,
//! * [`runner`]: command line driven runs.
//!
//! A run is fully reproducible given its seed:
//!
//! ```rust
//! use std::sync::Arc;
//! use zombie_sim::prelude::*;
//!
//! let config = SimulationConfig::builder().seed(42).build().unwrap();
//! let policy = Arc::new(default_lockdown_policy());
//!
//! let mut first = SimulationEngine::from_config(config.clone(), Arc::clone(&policy)).unwrap();
//! let mut second = SimulationEngine::from_config(config, policy).unwrap();
//! assert_eq!(first.run().unwrap(), second.run().unwrap());
//! assert_eq!(first.history()[0], PopulationState::new(46, 4, 0, 0));
//! ```
pub mod engine;
pub mod error;
pub mod log;
pub mod numeric;
pub mod parameters;
pub mod policy;
pub mod random;
pub mod report;
pub mod runner;
pub mod sampling;
pub mod state;
pub mod transmission;

pub mod prelude {
    pub use crate::engine::{DailyTransitions, SimulationEngine};
    pub use crate::error::SimError;
    pub use crate::parameters::{LockdownParameters, SimulationConfig, SimulationConfigBuilder};
    pub use crate::policy::{
        default_lockdown_policy, weekly_lockdown, PolicyRule, PolicySet, Weekday,
    };
    pub use crate::random::{create_rng, SimRng};
    pub use crate::sampling::{BinomialSampler, TransitionSampler};
    pub use crate::state::{Compartment, PopulationState};
    pub use crate::transmission::{infection_probability, ForceOfInfection};
}

// Re-exported so model code can use the same versions.
pub use rand;
pub use rand_distr;
