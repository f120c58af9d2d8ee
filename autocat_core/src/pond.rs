//! The Pond: species counts plus the stochastic step that mutates them.
//!
//! Each [`Pond::step`] is one independent trial:
//!
//! 1. Draw a rule index uniformly from `[0, rules.len())`.
//! 2. The rule fires iff every reactant occurrence is covered by the
//!    current counts and the catalyst (if any) has a count above zero.
//! 3. On fire, each reactant occurrence is decremented, the product is
//!    incremented and the last-event string is replaced. On a blocked
//!    trial nothing changes, including the last-event string.
//!
//! The random source is injected at construction, so a pond built from
//! the same seed, counts and rules replays the same trajectory.

use crate::error::ConfigError;
use crate::reaction::{validate_species, Reaction, ReactionSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Last event before any step has run.
pub const INITIAL_EVENT: &str = "Simulation Initialized";

/// Last event after stepping a pond with no rules.
pub const NO_REACTIONS_EVENT: &str = "No reactions defined.";

/// Prefix of every successful-reaction event.
pub const REACTION_EVENT_PREFIX: &str = "Reaction: ";

/// Species name -> count. Keys are fixed after construction.
pub type SpeciesCounts = BTreeMap<String, u64>;

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Rule at this index fired
    Fired { rule: usize },

    /// Rule at this index was drawn but lacked reactants or catalyst
    Blocked { rule: usize },

    /// The rule set is empty
    NoReactions,
}

impl StepOutcome {
    pub fn fired(&self) -> bool {
        matches!(self, StepOutcome::Fired { .. })
    }

    /// Index of the drawn rule, if any was drawn.
    pub fn rule(&self) -> Option<usize> {
        match self {
            StepOutcome::Fired { rule } | StepOutcome::Blocked { rule } => Some(*rule),
            StepOutcome::NoReactions => None,
        }
    }
}

/// Owned, serializable copy of the observable pond state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PondSnapshot {
    pub counts: SpeciesCounts,
    pub last_event: String,
    pub steps: u64,
}

/// The simulation environment.
pub struct Pond<R = ChaCha8Rng> {
    counts: SpeciesCounts,
    rules: ReactionSet,
    last_event: String,
    rng: R,
    steps: u64,
}

impl Pond<ChaCha8Rng> {
    /// Builds a pond driven by a ChaCha8 stream seeded from `seed`.
    pub fn seeded<I, K>(initial: I, rules: ReactionSet, seed: u64) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        Self::new(initial, rules, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Pond<R> {
    /// Builds a pond from seed counts, a rule set and a random source.
    ///
    /// Negative seed counts and malformed species names are rejected.
    /// Species that only appear in rules start at zero.
    pub fn new<I, K>(initial: I, rules: ReactionSet, rng: R) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let mut counts = SpeciesCounts::new();
        for (species, count) in initial {
            let species = species.into();
            validate_species(&species)?;
            let count = u64::try_from(count).map_err(|_| ConfigError::NegativeCount {
                species: species.clone(),
                count,
            })?;
            counts.insert(species, count);
        }

        for species in rules.species() {
            counts.entry(species.to_string()).or_insert(0);
        }

        Ok(Self {
            counts,
            rules,
            last_event: INITIAL_EVENT.to_string(),
            rng,
            steps: 0,
        })
    }

    /// Runs one stochastic reaction trial.
    pub fn step(&mut self) -> StepOutcome {
        self.steps += 1;

        if self.rules.is_empty() {
            self.last_event = NO_REACTIONS_EVENT.to_string();
            return StepOutcome::NoReactions;
        }

        let index = self.rng.gen_range(0..self.rules.len());
        let reaction = &self.rules.as_slice()[index];

        if !can_fire(&self.counts, reaction) {
            return StepOutcome::Blocked { rule: index };
        }

        apply(&mut self.counts, reaction);
        self.last_event = format!("{}{}", REACTION_EVENT_PREFIX, reaction);
        StepOutcome::Fired { rule: index }
    }

    /// Runs `n` steps and returns how many of them fired.
    pub fn step_many(&mut self, n: u64) -> u64 {
        (0..n).filter(|_| self.step().fired()).count() as u64
    }
}

impl<R> Pond<R> {
    /// Current counts. Read-only; only `step` mutates them.
    pub fn counts(&self) -> &SpeciesCounts {
        &self.counts
    }

    /// Count of one species. Untracked species count as zero.
    pub fn count(&self, species: &str) -> u64 {
        count_of(&self.counts, species)
    }

    /// Description of the most recent successful reaction.
    pub fn last_event(&self) -> &str {
        &self.last_event
    }

    pub fn rules(&self) -> &ReactionSet {
        &self.rules
    }

    /// Steps attempted so far, fired or not.
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Whether the rule at `index` could fire against the current counts.
    pub fn can_fire(&self, index: usize) -> bool {
        self.rules
            .get(index)
            .is_some_and(|reaction| can_fire(&self.counts, reaction))
    }

    /// Indices of every rule that could fire right now.
    pub fn fireable_rules(&self) -> Vec<usize> {
        (0..self.rules.len()).filter(|&i| self.can_fire(i)).collect()
    }

    /// True when no step can change the counts any more.
    pub fn is_quiescent(&self) -> bool {
        self.fireable_rules().is_empty()
    }

    pub fn snapshot(&self) -> PondSnapshot {
        PondSnapshot {
            counts: self.counts.clone(),
            last_event: self.last_event.clone(),
            steps: self.steps,
        }
    }
}

fn count_of(counts: &SpeciesCounts, species: &str) -> u64 {
    counts.get(species).copied().unwrap_or(0)
}

/// Availability check. Repeated reactants need one unit per occurrence.
fn can_fire(counts: &SpeciesCounts, reaction: &Reaction) -> bool {
    let mut demand: HashMap<&str, u64> = HashMap::new();
    for reactant in &reaction.reactants {
        let needed = demand.entry(reactant.as_str()).or_insert(0);
        *needed += 1;
        if count_of(counts, reactant) < *needed {
            return false;
        }
    }

    match &reaction.catalyst {
        Some(catalyst) => count_of(counts, catalyst) > 0,
        None => true,
    }
}

/// Applies a reaction that already passed `can_fire`. The catalyst role
/// contributes no mutation of its own.
fn apply(counts: &mut SpeciesCounts, reaction: &Reaction) {
    for reactant in &reaction.reactants {
        match counts.get_mut(reactant) {
            Some(count) if *count > 0 => *count -= 1,
            _ => panic!(
                "count of {} would go negative firing {}",
                reactant, reaction
            ),
        }
    }
    *counts.entry(reaction.product.clone()).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn canonical_seed() -> Vec<(&'static str, i64)> {
        vec![("A", 500), ("B", 500), ("C", 500), ("D", 0), ("E", 1)]
    }

    fn single_rule(rule: Reaction, initial: Vec<(&'static str, i64)>) -> Pond {
        let rules = ReactionSet::new(vec![rule]).unwrap();
        Pond::seeded(initial, rules, 42).unwrap()
    }

    /// Quantity preserved by every canonical rule.
    fn canonical_invariant(pond: &Pond) -> i64 {
        pond.count("A") as i64 - pond.count("B") as i64
            + pond.count("C") as i64
            + pond.count("E") as i64
    }

    #[test]
    fn test_initial_state() {
        let pond = Pond::seeded(canonical_seed(), ReactionSet::canonical(), 1).unwrap();
        assert_eq!(pond.last_event(), INITIAL_EVENT);
        assert_eq!(pond.steps_taken(), 0);
        assert_eq!(pond.count("A"), 500);
        assert_eq!(pond.count("E"), 1);
        assert_eq!(pond.count("Z"), 0);
    }

    #[test]
    fn test_missing_rule_species_default_to_zero() {
        let pond = single_rule(Reaction::new(["X"], "Y"), vec![]);
        let expected: SpeciesCounts = [("X".to_string(), 0), ("Y".to_string(), 0)].into();
        assert_eq!(pond.counts(), &expected);
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = Pond::seeded([("A", -1)], ReactionSet::canonical(), 0).err();
        assert_eq!(
            err,
            Some(ConfigError::NegativeCount {
                species: "A".to_string(),
                count: -1
            })
        );
    }

    #[test]
    fn test_invalid_seed_species_rejected() {
        let err = Pond::seeded([("not valid", 1)], ReactionSet::empty(), 0).err();
        assert!(matches!(err, Some(ConfigError::InvalidSpecies { .. })));
    }

    #[test]
    fn test_synthesis_deltas() {
        let mut pond = single_rule(Reaction::new(["A", "B"], "D"), vec![("A", 5), ("B", 3)]);
        assert_eq!(pond.step(), StepOutcome::Fired { rule: 0 });
        assert_eq!(pond.count("A"), 4);
        assert_eq!(pond.count("B"), 2);
        assert_eq!(pond.count("D"), 1);
        assert_eq!(pond.last_event(), "Reaction: A + B -> D");
    }

    #[test]
    fn test_catalyst_not_consumed() {
        let rule = Reaction::new(["D", "A"], "E").catalyzed_by("E");
        let mut pond = single_rule(rule, vec![("A", 2), ("D", 2), ("E", 7)]);

        assert!(pond.step().fired());
        assert_eq!(pond.count("E"), 8);
        assert_eq!(pond.count("D"), 1);
        assert_eq!(pond.count("A"), 1);
        assert_eq!(pond.last_event(), "Reaction: D + A -> E (Cat: E)");
    }

    #[test]
    fn test_foreign_catalyst_untouched() {
        let rule = Reaction::new(["A"], "B").catalyzed_by("K");
        let mut pond = single_rule(rule, vec![("A", 3), ("K", 1)]);

        assert_eq!(pond.step_many(3), 3);
        assert_eq!(pond.count("K"), 1);
        assert_eq!(pond.count("B"), 3);
    }

    #[test]
    fn test_missing_catalyst_blocks() {
        let rule = Reaction::new(["D", "A"], "E").catalyzed_by("E");
        let mut pond = single_rule(rule, vec![("A", 5), ("D", 5), ("E", 0)]);
        let before = pond.snapshot();

        assert_eq!(pond.step(), StepOutcome::Blocked { rule: 0 });
        assert_eq!(pond.counts(), &before.counts);
        assert_eq!(pond.last_event(), before.last_event);
    }

    #[test]
    fn test_blocked_step_keeps_last_success() {
        let mut pond = single_rule(Reaction::new(["A"], "B"), vec![("A", 1)]);
        assert!(pond.step().fired());
        let after_fire = pond.snapshot();

        for _ in 0..10 {
            assert_eq!(pond.step(), StepOutcome::Blocked { rule: 0 });
        }
        assert_eq!(pond.counts(), &after_fire.counts);
        assert_eq!(pond.last_event(), "Reaction: A -> B");
        assert_eq!(pond.steps_taken(), 11);
    }

    #[test]
    fn test_repeated_reactant_needs_two_units() {
        let mut pond = single_rule(Reaction::new(["A", "A"], "B"), vec![("A", 1)]);
        assert_eq!(pond.step(), StepOutcome::Blocked { rule: 0 });
        assert_eq!(pond.count("A"), 1);

        let mut pond = single_rule(Reaction::new(["A", "A"], "B"), vec![("A", 5)]);
        assert_eq!(pond.step_many(10), 2);
        assert_eq!(pond.count("A"), 1);
        assert_eq!(pond.count("B"), 2);
        assert_eq!(pond.last_event(), "Reaction: A + A -> B");
    }

    #[test]
    fn test_catalyst_checked_before_consumption() {
        // E is both reactant and catalyst; one unit satisfies both roles.
        let rule = Reaction::new(["E"], "A").catalyzed_by("E");
        let mut pond = single_rule(rule, vec![("E", 1)]);
        assert!(pond.step().fired());
        assert_eq!(pond.count("E"), 0);
        assert_eq!(pond.count("A"), 1);
    }

    #[test]
    fn test_empty_rule_set_is_noop() {
        let mut pond = Pond::seeded([("A", 3), ("B", 4)], ReactionSet::empty(), 9).unwrap();
        let before = pond.counts().clone();

        for _ in 0..1000 {
            assert_eq!(pond.step(), StepOutcome::NoReactions);
        }
        assert_eq!(pond.counts(), &before);
        assert_eq!(pond.last_event(), NO_REACTIONS_EVENT);
        assert!(pond.is_quiescent());
    }

    #[test]
    fn test_starved_rule_never_fires() {
        let mut pond = single_rule(Reaction::new(["X"], "Y"), vec![("X", 0)]);
        assert_eq!(pond.step_many(1000), 0);
        assert_eq!(pond.count("X"), 0);
        assert_eq!(pond.count("Y"), 0);
        assert_eq!(pond.last_event(), INITIAL_EVENT);
        assert!(pond.is_quiescent());
    }

    #[test]
    fn test_uniform_selection() {
        let rules = ReactionSet::new(vec![
            Reaction::new(["A"], "B"),
            Reaction::new(["B"], "A"),
            Reaction::new(["C"], "D"),
            Reaction::new(["D"], "C"),
        ])
        .unwrap();
        let abundant = [("A", 1_000_000), ("B", 1_000_000), ("C", 1_000_000), ("D", 1_000_000)];
        let mut pond = Pond::seeded(abundant, rules, 7).unwrap();

        let mut fires = [0u64; 4];
        for _ in 0..40_000 {
            if let StepOutcome::Fired { rule } = pond.step() {
                fires[rule] += 1;
            }
        }
        for (rule, n) in fires.iter().enumerate() {
            assert!((9_000..=11_000).contains(n), "rule {} fired {} times", rule, n);
        }
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = Pond::seeded(canonical_seed(), ReactionSet::canonical(), 1234).unwrap();
        let mut b = Pond::seeded(canonical_seed(), ReactionSet::canonical(), 1234).unwrap();
        a.step_many(5_000);
        b.step_many(5_000);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_canonical_long_run() {
        let mut pond = Pond::seeded(canonical_seed(), ReactionSet::canonical(), 42).unwrap();
        let mut autocatalysis_fired = false;
        let mut peak_e = pond.count("E");

        for _ in 0..100_000 {
            if pond.step() == (StepOutcome::Fired { rule: 2 }) {
                autocatalysis_fired = true;
            }
            peak_e = peak_e.max(pond.count("E"));
        }

        assert!(autocatalysis_fired);
        assert!(peak_e > 1);
        assert_eq!(canonical_invariant(&pond), 501);

        let event = pond
            .last_event()
            .strip_prefix(REACTION_EVENT_PREFIX)
            .expect("a reaction has fired");
        let reaction: Reaction = event.parse().unwrap();
        assert!(pond.rules().iter().any(|r| r == &reaction));
    }

    #[test]
    fn test_fireable_rules() {
        let pond = Pond::seeded([("A", 1), ("B", 1)], ReactionSet::canonical(), 0).unwrap();
        // Only A + B -> D has its inputs; E is absent.
        assert_eq!(pond.fireable_rules(), vec![0]);
        assert!(pond.can_fire(0));
        assert!(!pond.can_fire(2));
        assert!(!pond.can_fire(99));
    }

    proptest! {
        #[test]
        fn prop_canonical_invariant_holds(
            seed in any::<u64>(),
            a in 0i64..50, b in 0i64..50, c in 0i64..50, d in 0i64..50, e in 0i64..50,
            steps in 0u64..2_000,
        ) {
            let seed_counts = [("A", a), ("B", b), ("C", c), ("D", d), ("E", e)];
            let mut pond = Pond::seeded(seed_counts, ReactionSet::canonical(), seed).unwrap();
            let before = canonical_invariant(&pond);
            let b_before = pond.count("B");

            pond.step_many(steps);

            prop_assert_eq!(canonical_invariant(&pond), before);
            prop_assert!(pond.count("B") <= b_before);
            prop_assert_eq!(pond.steps_taken(), steps);
        }

        #[test]
        fn prop_blocked_step_changes_nothing(seed in any::<u64>(), steps in 1u64..500) {
            let rules = ReactionSet::new(vec![
                Reaction::new(["A", "A"], "B"),
                Reaction::new(["B"], "C").catalyzed_by("K"),
            ]).unwrap();
            let mut pond = Pond::seeded([("A", 3), ("K", 0)], rules, seed).unwrap();

            for _ in 0..steps {
                let before = pond.snapshot();
                if let StepOutcome::Blocked { .. } = pond.step() {
                    prop_assert_eq!(pond.counts(), &before.counts);
                    prop_assert_eq!(pond.last_event(), before.last_event.as_str());
                }
            }
            prop_assert!(pond.count("A") >= 1);
            prop_assert_eq!(pond.count("C"), 0);
            prop_assert_eq!(pond.count("K"), 0);
        }
    }
}
