//! The simulation engine.
//!
//! A [`SimulationEngine`] owns one run: its validated configuration, its random number
//! generator, and the history of population states from day 0 up to the current day. Each call
//! to [`SimulationEngine::advance`] performs one daily transition:
//!
//! 1. ask the policy whether the day is under lockdown,
//! 2. compute the infection probability from the start-of-day bitten count,
//! 3. draw new infections, deaths and zombifications, in that order, all from the
//!    start-of-day counts,
//! 4. apply the draws simultaneously.
//!
//! ```rust
//! use std::sync::Arc;
//! use zombie_sim::engine::SimulationEngine;
//! use zombie_sim::parameters::SimulationConfig;
//!
//! let config = SimulationConfig::builder().seed(42).build().unwrap();
//! let policy = Arc::new(config.lockdown.policy_set());
//! let mut engine = SimulationEngine::from_config(config, policy).unwrap();
//! engine.run().unwrap();
//! assert_eq!(engine.history().len(), 31);
//! ```

use std::sync::Arc;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::parameters::SimulationConfig;
use crate::policy::PolicySet;
use crate::random::{create_rng, SimRng};
use crate::sampling::{BinomialSampler, TransitionSampler};
use crate::state::{Compartment, PopulationState};
use crate::transmission::ForceOfInfection;

/// What happened during the step that starts on `day`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTransitions {
    pub day: u64,
    pub locked_down: bool,
    pub infection_probability: f64,
    pub new_infections: u64,
    pub new_dead: u64,
    pub new_zombie: u64,
}

/// A count that had to be floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericGuardViolation {
    pub day: u64,
    pub compartment: Compartment,
    pub value: i128,
}

pub struct SimulationEngine<S: TransitionSampler = BinomialSampler> {
    config: SimulationConfig,
    force_of_infection: ForceOfInfection,
    policy: Arc<PolicySet>,
    sampler: S,
    rng: SimRng,
    history: Vec<PopulationState>,
    transitions: Vec<DailyTransitions>,
    guard_violations: Vec<NumericGuardViolation>,
}

impl SimulationEngine<BinomialSampler> {
    /// Creates an engine whose generator is seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ConfigurationError` if the config is invalid.
    pub fn from_config(
        config: SimulationConfig,
        policy: Arc<PolicySet>,
    ) -> Result<Self, SimError> {
        let rng = create_rng(config.seed);
        Self::new(config, policy, rng)
    }

    /// Creates an engine drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ConfigurationError` if the config is invalid.
    pub fn new(
        config: SimulationConfig,
        policy: Arc<PolicySet>,
        rng: SimRng,
    ) -> Result<Self, SimError> {
        Self::with_sampler(config, policy, rng, BinomialSampler)
    }
}

impl<S: TransitionSampler> SimulationEngine<S> {
    /// Creates an engine that draws transitions with `sampler`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ConfigurationError` if the config is invalid.
    pub fn with_sampler(
        config: SimulationConfig,
        policy: Arc<PolicySet>,
        rng: SimRng,
        sampler: S,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let initial_state = config.initial_state();
        debug!(
            "initializing simulation: population={}, days={}, initial state={:?}, {} policy rule(s)",
            config.population_size,
            config.days,
            initial_state,
            policy.len()
        );

        let days = usize::try_from(config.days).unwrap_or(usize::MAX);
        let mut history = Vec::with_capacity(days.saturating_add(1));
        history.push(initial_state);

        Ok(SimulationEngine {
            force_of_infection: config.force_of_infection(),
            config,
            policy,
            sampler,
            rng,
            history,
            transitions: Vec::with_capacity(days),
            guard_violations: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn policy(&self) -> &PolicySet {
        &self.policy
    }

    /// The last day for which a state exists.
    #[must_use]
    pub fn current_day(&self) -> u64 {
        self.history.len() as u64 - 1
    }

    #[must_use]
    pub fn current_state(&self) -> &PopulationState {
        // The history always holds at least the day 0 state.
        &self.history[self.history.len() - 1]
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_day() >= self.config.days
    }

    #[must_use]
    pub fn state_at(&self, day: u64) -> Option<&PopulationState> {
        usize::try_from(day).ok().and_then(|day| self.history.get(day))
    }

    /// States for days `0..=current_day()`, indexed by day.
    #[must_use]
    pub fn history(&self) -> &[PopulationState] {
        &self.history
    }

    #[must_use]
    pub fn into_history(self) -> Vec<PopulationState> {
        self.history
    }

    /// One entry per completed step; entry `i` describes the step from day `i` to `i + 1`.
    #[must_use]
    pub fn transitions(&self) -> &[DailyTransitions] {
        &self.transitions
    }

    /// Counts that had to be floored at zero. Empty unless the sampler misbehaves.
    #[must_use]
    pub fn guard_violations(&self) -> &[NumericGuardViolation] {
        &self.guard_violations
    }

    #[must_use]
    pub fn locked_down_at(&self, day: u64) -> bool {
        self.policy.is_locked_down(day)
    }

    /// Advances from the current day to the next one and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `SimError::RunComplete` if the final day has already been reached, and
    /// `SimError::NumericGuardViolation` if flooring a negative count would break
    /// conservation of the population.
    pub fn advance(&mut self) -> Result<&PopulationState, SimError> {
        if self.is_complete() {
            return Err(SimError::RunComplete {
                days: self.config.days,
            });
        }

        let day = self.current_day();
        let current = *self.current_state();
        let locked_down = self.locked_down_at(day);

        let infection_probability = self.force_of_infection.infection_probability(
            current.bitten,
            self.config.population_size,
            locked_down,
        );

        // Draw order is part of the reproducibility contract.
        let new_infections = self
            .sampler
            .sample(current.normal, infection_probability, &mut self.rng);
        let new_dead = self
            .sampler
            .sample(current.bitten, self.config.p_bitten_to_dead, &mut self.rng);
        let new_zombie = self
            .sampler
            .sample(current.dead, self.config.p_dead_to_zombie, &mut self.rng);

        let transitions = DailyTransitions {
            day,
            locked_down,
            infection_probability,
            new_infections,
            new_dead,
            new_zombie,
        };
        trace!("day {day}: {transitions:?}");

        let next = self.apply(current, &transitions)?;
        self.transitions.push(transitions);
        self.history.push(next);
        Ok(self.current_state())
    }

    /// Advances until the final day and returns the full history.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by [`SimulationEngine::advance`].
    pub fn run(&mut self) -> Result<&[PopulationState], SimError> {
        while !self.is_complete() {
            self.advance()?;
        }
        info!(
            "simulation finished after {} days: {:?}",
            self.config.days,
            self.current_state()
        );
        Ok(&self.history)
    }

    fn apply(
        &mut self,
        current: PopulationState,
        transitions: &DailyTransitions,
    ) -> Result<PopulationState, SimError> {
        let new_infections = i128::from(transitions.new_infections);
        let new_dead = i128::from(transitions.new_dead);
        let new_zombie = i128::from(transitions.new_zombie);

        let unclamped = [
            (
                Compartment::Normal,
                i128::from(current.normal) - new_infections,
            ),
            (
                Compartment::Bitten,
                i128::from(current.bitten) + new_infections - new_dead,
            ),
            (
                Compartment::Dead,
                i128::from(current.dead) + new_dead - new_zombie,
            ),
            (
                Compartment::Zombie,
                i128::from(current.zombie) + new_zombie,
            ),
        ];

        let mut counts = [0_u64; 4];
        for (count, (compartment, value)) in counts.iter_mut().zip(unclamped) {
            if value < 0 {
                let violation = NumericGuardViolation {
                    day: transitions.day,
                    compartment,
                    value,
                };
                warn!("flooring negative count at zero: {violation:?}");
                self.guard_violations.push(violation);
            }
            *count = u64::try_from(value.max(0)).unwrap_or(u64::MAX);
        }

        let next = PopulationState::new(counts[0], counts[1], counts[2], counts[3]);
        if next.total() != self.config.population_size {
            let first = self
                .guard_violations
                .last()
                .copied()
                .filter(|violation| violation.day == transitions.day);
            let (compartment, value) = first.map_or_else(
                || (Compartment::Normal, i128::from(next.normal)),
                |violation| (violation.compartment, violation.value),
            );
            return Err(SimError::NumericGuardViolation {
                day: transitions.day,
                compartment,
                value,
            });
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::policy::{default_lockdown_policy, PolicyRule};
    use crate::random::create_rng;
    use crate::sampling::ExpectedValueSampler;

    /// Moves everybody in every compartment, every day.
    struct EveryoneMoves;

    impl TransitionSampler for EveryoneMoves {
        fn sample<R: Rng + ?Sized>(&self, count: u64, _probability: f64, _rng: &mut R) -> u64 {
            count
        }
    }

    /// Claims one more person moved than existed.
    struct Overdraw;

    impl TransitionSampler for Overdraw {
        fn sample<R: Rng + ?Sized>(&self, count: u64, _probability: f64, _rng: &mut R) -> u64 {
            count + 1
        }
    }

    fn seeded_config(seed: u64) -> SimulationConfig {
        SimulationConfig::builder().seed(seed).build().unwrap()
    }

    fn engine(seed: u64) -> SimulationEngine {
        SimulationEngine::from_config(seeded_config(seed), Arc::new(default_lockdown_policy()))
            .unwrap()
    }

    #[test]
    fn day_zero_state() {
        let engine = engine(42);
        assert_eq!(engine.current_day(), 0);
        assert_eq!(*engine.current_state(), PopulationState::new(46, 4, 0, 0));
        assert_eq!(engine.state_at(0), Some(&PopulationState::new(46, 4, 0, 0)));
        assert_eq!(engine.state_at(1), None);
    }

    #[test]
    fn run_produces_days_plus_one_states() {
        let mut engine = engine(42);
        let history = engine.run().unwrap();
        assert_eq!(history.len(), 31);
        assert_eq!(engine.transitions().len(), 30);
        assert!(engine.is_complete());
        assert_eq!(engine.current_day(), 30);
    }

    #[test]
    fn population_is_conserved() {
        for seed in 0..50 {
            let mut engine = engine(seed);
            for state in engine.run().unwrap() {
                assert_eq!(state.total(), 50, "seed {seed}");
            }
            assert!(engine.guard_violations().is_empty());
        }
    }

    #[test]
    fn transitions_are_consistent_with_history() {
        let mut engine = engine(3);
        engine.run().unwrap();
        for t in engine.transitions() {
            let before = engine.state_at(t.day).unwrap();
            let after = engine.state_at(t.day + 1).unwrap();
            assert!(t.new_infections <= before.normal);
            assert!(t.new_dead <= before.bitten);
            assert!(t.new_zombie <= before.dead);
            assert_eq!(after.normal, before.normal - t.new_infections);
            assert_eq!(after.bitten, before.bitten + t.new_infections - t.new_dead);
            assert_eq!(after.dead, before.dead + t.new_dead - t.new_zombie);
            assert_eq!(after.zombie, before.zombie + t.new_zombie);
            assert_eq!(t.locked_down, matches!(t.day % 7, 0 | 3 | 5));
        }
    }

    #[test]
    fn same_seed_same_history() {
        let mut first = engine(42);
        let mut second = engine(42);
        assert_eq!(first.run().unwrap(), second.run().unwrap());
        assert_eq!(first.transitions(), second.transitions());
    }

    #[test]
    fn explicit_rng_matches_configured_seed() {
        let config = SimulationConfig::builder().build().unwrap();
        let policy = Arc::new(default_lockdown_policy());
        let mut explicit = SimulationEngine::new(config, policy, create_rng(Some(42))).unwrap();
        let mut configured = engine(42);
        assert_eq!(explicit.run().unwrap(), configured.run().unwrap());
    }

    #[test]
    fn advance_past_final_day_fails() {
        let config = SimulationConfig::builder().days(2).seed(1).build().unwrap();
        let mut engine =
            SimulationEngine::from_config(config, Arc::new(PolicySet::new())).unwrap();
        engine.advance().unwrap();
        engine.advance().unwrap();
        assert!(matches!(
            engine.advance(),
            Err(SimError::RunComplete { days: 2 })
        ));
        assert_eq!(engine.history().len(), 3);
    }

    #[test]
    fn zero_days_keeps_only_initial_state() {
        let config = SimulationConfig::builder().days(0).seed(1).build().unwrap();
        let mut engine =
            SimulationEngine::from_config(config, Arc::new(PolicySet::new())).unwrap();
        assert!(engine.is_complete());
        assert_eq!(engine.run().unwrap(), &[PopulationState::new(46, 4, 0, 0)]);
    }

    #[test]
    fn zero_population_is_a_configuration_error() {
        let config = SimulationConfig::builder()
            .population_size(0)
            .build()
            .unwrap();
        let result = SimulationEngine::from_config(config, Arc::new(PolicySet::new()));
        assert!(matches!(result, Err(SimError::ConfigurationError(_))));
    }

    #[test]
    fn no_bitten_means_no_infections() {
        let config = SimulationConfig::builder()
            .prop_normal(1.0)
            .prop_bitten(0.0)
            .seed(42)
            .build()
            .unwrap();
        let mut engine =
            SimulationEngine::from_config(config, Arc::new(default_lockdown_policy())).unwrap();
        let history = engine.run().unwrap().to_vec();
        assert!(history.iter().all(|s| *s == PopulationState::new(50, 0, 0, 0)));
        for t in engine.transitions() {
            assert_eq!(t.infection_probability, 0.0);
            assert_eq!(t.new_infections, 0);
        }
    }

    #[test]
    fn simultaneous_update() {
        // If draws were taken from already-updated counts, the newly bitten would die and
        // the newly dead would turn on the same day.
        let config = SimulationConfig::builder().days(3).build().unwrap();
        let mut engine = SimulationEngine::with_sampler(
            config,
            Arc::new(PolicySet::new()),
            create_rng(Some(0)),
            EveryoneMoves,
        )
        .unwrap();
        assert_eq!(*engine.advance().unwrap(), PopulationState::new(0, 46, 4, 0));
        assert_eq!(*engine.advance().unwrap(), PopulationState::new(0, 0, 46, 4));
        assert_eq!(*engine.advance().unwrap(), PopulationState::new(0, 0, 0, 50));
        assert!(engine.guard_violations().is_empty());
    }

    #[test]
    fn overdrawing_sampler_trips_the_guard() {
        let config = SimulationConfig::builder().days(3).build().unwrap();
        let mut engine = SimulationEngine::with_sampler(
            config,
            Arc::new(PolicySet::new()),
            create_rng(Some(0)),
            Overdraw,
        )
        .unwrap();
        let result = engine.advance();
        assert!(matches!(
            result,
            Err(SimError::NumericGuardViolation { day: 0, .. })
        ));
        assert!(!engine.guard_violations().is_empty());
        // The failed step is not recorded.
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn lockdown_scale_suppresses_infection_on_lockdown_days() {
        let config = SimulationConfig::builder()
            .seed(5)
            .lockdown(crate::parameters::LockdownParameters {
                weekdays: vec![],
                beta_scale: 0.0,
            })
            .build()
            .unwrap();
        let always = PolicySet::new().with_rule(PolicyRule::new("always", |_| true));
        let mut engine = SimulationEngine::from_config(config, Arc::new(always)).unwrap();
        engine.run().unwrap();
        assert!(engine
            .transitions()
            .iter()
            .all(|t| t.locked_down && t.new_infections == 0));
        assert_eq!(engine.current_state().normal, 46);
    }

    #[test]
    fn expected_value_trajectory() {
        // Computed independently with round(count * p) transitions.
        let config = SimulationConfig::builder().build().unwrap();
        let mut engine = SimulationEngine::with_sampler(
            config,
            Arc::new(default_lockdown_policy()),
            create_rng(Some(0)),
            ExpectedValueSampler,
        )
        .unwrap();
        let expected: Vec<PopulationState> = [
            (46, 4, 0, 0),
            (44, 6, 0, 0),
            (42, 7, 1, 0),
            (39, 9, 2, 0),
            (36, 11, 3, 0),
            (33, 13, 4, 0),
            (29, 16, 5, 0),
            (25, 18, 7, 0),
            (21, 20, 9, 0),
            (18, 21, 10, 1),
            (15, 22, 11, 2),
            (12, 23, 12, 3),
            (10, 23, 13, 4),
            (8, 23, 14, 5),
            (7, 22, 15, 6),
            (6, 21, 16, 7),
            (5, 20, 17, 8),
            (4, 19, 18, 9),
            (3, 18, 19, 10),
            (3, 16, 20, 11),
            (3, 14, 21, 12),
            (3, 13, 21, 13),
            (3, 12, 21, 14),
            (3, 11, 21, 15),
            (3, 10, 21, 16),
            (3, 9, 21, 17),
            (3, 8, 21, 18),
            (3, 7, 21, 19),
            (3, 6, 21, 20),
            (3, 5, 21, 21),
            (3, 5, 20, 22),
        ]
        .into_iter()
        .map(|(normal, bitten, dead, zombie)| PopulationState::new(normal, bitten, dead, zombie))
        .collect();
        assert_eq!(engine.run().unwrap(), expected.as_slice());
    }

    #[test]
    fn independent_runs_on_threads() {
        let policy = Arc::new(default_lockdown_policy());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let policy = Arc::clone(&policy);
                std::thread::spawn(move || {
                    let mut engine =
                        SimulationEngine::from_config(seeded_config(42), policy).unwrap();
                    engine.run().unwrap().to_vec()
                })
            })
            .collect();
        let histories: Vec<Vec<PopulationState>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for history in &histories[1..] {
            assert_eq!(history, &histories[0]);
        }
    }
}
