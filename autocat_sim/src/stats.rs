//! Per-rule firing statistics collected while a pond runs.

use autocat_core::{SpeciesCounts, StepOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters over every step observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionStats {
    /// Steps observed
    pub attempts: u64,

    /// Fires, indexed by rule
    pub fired: Vec<u64>,

    /// Blocked draws, indexed by rule
    pub blocked: Vec<u64>,

    /// Steps taken on an empty rule set
    pub no_reaction_steps: u64,

    /// Highest count seen per species
    pub peaks: BTreeMap<String, u64>,
}

impl ReactionStats {
    pub fn new(rule_count: usize, counts: &SpeciesCounts) -> Self {
        Self {
            fired: vec![0; rule_count],
            blocked: vec![0; rule_count],
            peaks: counts.clone(),
            ..Default::default()
        }
    }

    /// Records one step and the counts it left behind.
    pub fn record(&mut self, outcome: StepOutcome, counts: &SpeciesCounts) {
        self.attempts += 1;
        match outcome {
            StepOutcome::Fired { rule } => {
                bump(&mut self.fired, rule);
                for (species, &count) in counts {
                    let peak = self.peaks.entry(species.clone()).or_insert(0);
                    *peak = (*peak).max(count);
                }
            }
            StepOutcome::Blocked { rule } => bump(&mut self.blocked, rule),
            StepOutcome::NoReactions => self.no_reaction_steps += 1,
        }
    }

    pub fn total_fired(&self) -> u64 {
        self.fired.iter().sum()
    }

    pub fn peak(&self, species: &str) -> u64 {
        self.peaks.get(species).copied().unwrap_or(0)
    }

    /// Share of all steps in which each rule was drawn (fired or blocked).
    pub fn draw_frequencies(&self) -> Vec<f64> {
        if self.attempts == 0 {
            return vec![0.0; self.fired.len()];
        }
        self.fired
            .iter()
            .zip(&self.blocked)
            .map(|(f, b)| (f + b) as f64 / self.attempts as f64)
            .collect()
    }

    /// Share of all steps in which each rule fired.
    pub fn fire_frequencies(&self) -> Vec<f64> {
        if self.attempts == 0 {
            return vec![0.0; self.fired.len()];
        }
        self.fired
            .iter()
            .map(|&f| f as f64 / self.attempts as f64)
            .collect()
    }
}

fn bump(slots: &mut Vec<u64>, index: usize) {
    if slots.len() <= index {
        slots.resize(index + 1, 0);
    }
    slots[index] += 1;
}
