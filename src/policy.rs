//! Lockdown policies.
//!
//! A [`PolicyRule`] is a pure decision function from a step index to "lockdown active". A
//! [`PolicySet`] combines rules with logical OR. Rules carry no per-run state, so a single
//! `PolicySet` can be shared (e.g. behind an `Arc`) by any number of simulation runs.
//!
//! Steps are mapped onto a seven day week with step `0` being a Monday:
//!
//! ```rust
//! use zombie_sim::policy::{default_lockdown_policy, Weekday};
//!
//! let policy = default_lockdown_policy();
//! assert_eq!(Weekday::of_step(10), Weekday::Thursday);
//! assert!(policy.is_locked_down(10));
//! assert!(!policy.is_locked_down(11));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub const DAYS_PER_WEEK: u64 = 7;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

const WEEK: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

impl Weekday {
    /// The weekday a step falls on. Total over all steps.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn of_step(step: u64) -> Weekday {
        WEEK[(step % DAYS_PER_WEEK) as usize]
    }

    /// Position within the week, Monday being `0`.
    #[must_use]
    pub fn index(self) -> u64 {
        self as u64
    }
}

type DecisionFn = dyn Fn(u64) -> bool + Send + Sync;

/// A named lockdown decision function.
#[derive(Clone)]
pub struct PolicyRule {
    name: String,
    decide: Arc<DecisionFn>,
}

impl PolicyRule {
    pub fn new(
        name: impl Into<String>,
        decide: impl Fn(u64) -> bool + Send + Sync + 'static,
    ) -> Self {
        PolicyRule {
            name: name.into(),
            decide: Arc::new(decide),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this rule puts `step` under lockdown.
    #[must_use]
    pub fn applies(&self, step: u64) -> bool {
        (self.decide)(step)
    }
}

impl fmt::Debug for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Lockdown on the given weekdays of every week.
#[must_use]
pub fn weekly_lockdown(weekdays: &[Weekday]) -> PolicyRule {
    let mut days: Vec<Weekday> = weekdays.to_vec();
    days.sort_by_key(|day| day.index());
    days.dedup();

    let names: Vec<String> = days.iter().map(ToString::to_string).collect();
    let name = format!("weekly lockdown ({})", names.join(", "));
    PolicyRule::new(name, move |step| days.contains(&Weekday::of_step(step)))
}

/// Ordered collection of rules. Lockdown is active on a step if any rule says so.
#[derive(Clone, Debug, Default)]
pub struct PolicySet {
    rules: Vec<PolicyRule>,
}

impl PolicySet {
    #[must_use]
    pub fn new() -> Self {
        PolicySet::default()
    }

    pub fn add_rule(&mut self, rule: PolicyRule) {
        self.rules.push(rule);
    }

    #[must_use]
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.add_rule(rule);
        self
    }

    #[must_use]
    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// False for an empty set.
    #[must_use]
    pub fn is_locked_down(&self, step: u64) -> bool {
        self.rules.iter().any(|rule| rule.applies(step))
    }
}

impl FromIterator<PolicyRule> for PolicySet {
    fn from_iter<I: IntoIterator<Item = PolicyRule>>(iter: I) -> Self {
        PolicySet {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Lockdown every Monday, Thursday and Saturday.
#[must_use]
pub fn default_lockdown_policy() -> PolicySet {
    PolicySet::new().with_rule(weekly_lockdown(&[
        Weekday::Monday,
        Weekday::Thursday,
        Weekday::Saturday,
    ]))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn weekday_of_step_wraps() {
        assert_eq!(Weekday::of_step(0), Weekday::Monday);
        assert_eq!(Weekday::of_step(6), Weekday::Sunday);
        assert_eq!(Weekday::of_step(7), Weekday::Monday);
        assert_eq!(Weekday::of_step(u64::MAX), WEEK[(u64::MAX % 7) as usize]);
        for (i, day) in Weekday::iter().enumerate() {
            assert_eq!(day.index(), i as u64);
        }
    }

    #[test]
    fn weekday_parses_lowercase() {
        assert_eq!(Weekday::from_str("saturday").unwrap(), Weekday::Saturday);
        assert!(Weekday::from_str("funday").is_err());
    }

    #[test]
    fn default_policy_matches_mon_thu_sat() {
        let policy = default_lockdown_policy();
        for step in 0..100 {
            let expected = matches!(step % 7, 0 | 3 | 5);
            assert_eq!(policy.is_locked_down(step), expected, "step {step}");
        }
    }

    #[test]
    fn default_policy_is_periodic() {
        let policy = default_lockdown_policy();
        for step in 0..1_000 {
            assert_eq!(policy.is_locked_down(step), policy.is_locked_down(step + 7));
        }
        let large = u64::MAX - 7;
        assert_eq!(policy.is_locked_down(large), policy.is_locked_down(large + 7));
    }

    #[test]
    fn empty_set_never_locks_down() {
        let policy = PolicySet::new();
        assert!(policy.is_empty());
        assert!((0..14).all(|step| !policy.is_locked_down(step)));
    }

    #[test]
    fn rules_combine_with_or() {
        let policy: PolicySet = [
            weekly_lockdown(&[Weekday::Tuesday]),
            PolicyRule::new("first fortnight", |step| step < 14),
        ]
        .into_iter()
        .collect();
        assert_eq!(policy.len(), 2);
        let names: Vec<&str> = policy.rules().iter().map(PolicyRule::name).collect();
        assert_eq!(names, ["weekly lockdown (tuesday)", "first fortnight"]);
        assert!(policy.is_locked_down(2));
        assert!(policy.is_locked_down(13));
        assert!(policy.is_locked_down(15));
        assert!(!policy.is_locked_down(16));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let policy = default_lockdown_policy();
        for step in [0, 1, 3, 5, 6, 700] {
            let first = policy.is_locked_down(step);
            for _ in 0..5 {
                assert_eq!(policy.is_locked_down(step), first);
            }
        }
    }

    #[test]
    fn weekly_rule_name_lists_days_in_order() {
        let rule = weekly_lockdown(&[Weekday::Saturday, Weekday::Monday, Weekday::Monday]);
        assert_eq!(rule.name(), "weekly lockdown (monday, saturday)");
        assert_eq!(
            format!("{rule:?}"),
            "PolicyRule { name: \"weekly lockdown (monday, saturday)\", .. }"
        );
    }
}
