//! The population is partitioned into four mutually exclusive compartments. A `PopulationState`
//! holds the number of people in each compartment on one day.

use std::ops::Index;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Compartment {
    Normal,
    Bitten,
    Dead,
    Zombie,
}

/// Counts per compartment for a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PopulationState {
    pub normal: u64,
    pub bitten: u64,
    pub dead: u64,
    pub zombie: u64,
}

impl PopulationState {
    #[must_use]
    pub fn new(normal: u64, bitten: u64, dead: u64, zombie: u64) -> Self {
        PopulationState {
            normal,
            bitten,
            dead,
            zombie,
        }
    }

    /// Sum over all compartments. Equal to the population size for every state the engine
    /// produces.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.normal + self.bitten + self.dead + self.zombie
    }

    #[must_use]
    pub fn count(&self, compartment: Compartment) -> u64 {
        self[compartment]
    }
}

impl Index<Compartment> for PopulationState {
    type Output = u64;

    fn index(&self, compartment: Compartment) -> &u64 {
        match compartment {
            Compartment::Normal => &self.normal,
            Compartment::Bitten => &self.bitten,
            Compartment::Dead => &self.dead,
            Compartment::Zombie => &self.zombie,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn total_sums_all_compartments() {
        let state = PopulationState::new(46, 4, 0, 0);
        assert_eq!(state.total(), 50);
    }

    #[test]
    fn index_by_compartment() {
        let state = PopulationState::new(1, 2, 3, 4);
        let counts: Vec<u64> = Compartment::iter().map(|c| state[c]).collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
        assert_eq!(state.count(Compartment::Dead), 3);
    }

    #[test]
    fn compartment_names() {
        assert_eq!(Compartment::Zombie.to_string(), "zombie");
        assert_eq!(Compartment::from_str("bitten").unwrap(), Compartment::Bitten);
    }
}
