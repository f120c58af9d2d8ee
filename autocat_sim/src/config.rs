//! Run configuration, loadable from JSON.
//!
//! Every field is optional in the file; anything missing falls back to
//! the canonical pond:
//!
//! ```json
//! {
//!   "seed": 7,
//!   "steps": 50000,
//!   "initial_counts": { "A": 500, "B": 500, "C": 500, "D": 0, "E": 1 },
//!   "rules": [
//!     { "reactants": ["A", "B"], "product": "D" },
//!     { "reactants": ["D", "A"], "product": "E", "catalyst": "E" }
//!   ]
//! }
//! ```

use crate::context::SimContext;
use crate::error::SimError;
use autocat_core::{Pond, ReactionSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Total steps to run
    pub steps: u64,

    /// Steps per observer tick
    pub steps_per_tick: u64,

    /// Seed counts; negative values are rejected when the pond is built
    pub initial_counts: BTreeMap<String, i64>,

    /// Ordered rule list
    pub rules: ReactionSet,

    /// Species watched for dominance
    pub dominance_species: String,

    /// Count above which the watched species is considered dominant
    pub dominance_threshold: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 100_000,
            steps_per_tick: 100,
            initial_counts: canonical_counts(),
            rules: ReactionSet::canonical(),
            dominance_species: "E".to_string(),
            dominance_threshold: 5000,
        }
    }
}

/// `{A:500, B:500, C:500, D:0, E:1}`: food species plus one seed E.
pub fn canonical_counts() -> BTreeMap<String, i64> {
    [("A", 500), ("B", 500), ("C", 500), ("D", 0), ("E", 1)]
        .into_iter()
        .map(|(species, count)| (species.to_string(), count))
        .collect()
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Sets (or adds) one seed count.
    pub fn with_count(mut self, species: impl Into<String>, count: i64) -> Self {
        self.initial_counts.insert(species.into(), count);
        self
    }

    pub fn with_rules(mut self, rules: ReactionSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Builds the pond, with its RNG derived from `ctx`.
    pub fn build_pond(&self, ctx: &SimContext) -> Result<Pond, SimError> {
        let seed = self
            .initial_counts
            .iter()
            .map(|(species, count)| (species.clone(), *count));
        Ok(Pond::new(seed, self.rules.clone(), ctx.pond_rng())?)
    }
}
