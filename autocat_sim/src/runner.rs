//! Scenario runner - builds each scenario's pond, drives it and checks
//! the properties it exists to demonstrate.

use crate::config::{canonical_counts, SimConfig};
use crate::context::SimContext;
use crate::error::SimError;
use crate::exporter::{SimExport, SimFrame};
use crate::scenarios::ScenarioId;
use crate::stats::ReactionStats;
use crate::world::PondWorld;

use autocat_core::{
    PondSnapshot, Reaction, ReactionSet, SpeciesCounts, INITIAL_EVENT, NO_REACTIONS_EVENT,
    REACTION_EVENT_PREFIX,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Uniformity needs enough draws for the frequency check to be meaningful.
const MIN_UNIFORMITY_STEPS: u64 = 40_000;

/// Index of `D + A -> E (Cat: E)` in the canonical set.
const AUTOCATALYTIC_RULE: usize = 2;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Steps executed
    pub total_steps: u64,

    pub final_counts: SpeciesCounts,

    pub last_event: String,

    /// First failed assertion, if any
    pub failure_reason: Option<String>,

    pub stats: ReactionStats,
}

/// Runs verification scenarios.
pub struct ScenarioRunner {
    seed: u64,
    steps: u64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            steps: 100_000,
        }
    }

    /// Sets the number of steps each scenario runs.
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.execute(scenario, None)
    }

    /// Runs a scenario, recording one frame per tick.
    pub fn run_with_export(&self, scenario: ScenarioId) -> (ScenarioResult, Option<SimExport>) {
        let mut export = None;
        let result = self.execute(scenario, Some(&mut export));
        (result, export)
    }

    fn execute(
        &self,
        scenario: ScenarioId,
        export: Option<&mut Option<SimExport>>,
    ) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        let context = SimContext::new(self.seed);
        let mut world = match self
            .config_for(scenario)
            .and_then(|config| PondWorld::new(config, context))
        {
            Ok(world) => world,
            Err(e) => return self.setup_failure(scenario, e),
        };

        let initial = world.pond().snapshot();
        let failures = match export {
            Some(slot) => {
                let mut recording = SimExport::for_world(scenario.name(), &world);
                world.run_observed(|w| recording.add_frame(SimFrame::capture(w)));
                let failures = check(scenario, &world, &initial);
                recording.finalize(&world, failures.is_empty());
                *slot = Some(recording);
                failures
            }
            None => {
                world.run();
                check(scenario, &world, &initial)
            }
        };

        for failure in &failures {
            warn!("  {}: {}", scenario.name(), failure);
        }

        let pond = world.pond();
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failures.is_empty(),
            total_steps: pond.steps_taken(),
            final_counts: pond.counts().clone(),
            last_event: pond.last_event().to_string(),
            failure_reason: failures.into_iter().next(),
            stats: world.stats().clone(),
        }
    }

    fn setup_failure(&self, scenario: ScenarioId, error: SimError) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: false,
            total_steps: 0,
            final_counts: SpeciesCounts::new(),
            last_event: String::new(),
            failure_reason: Some(format!("setup failed: {}", error)),
            stats: ReactionStats::default(),
        }
    }

    fn config_for(&self, scenario: ScenarioId) -> Result<SimConfig, SimError> {
        let base = SimConfig {
            seed: self.seed,
            steps: self.steps,
            ..Default::default()
        };

        let config = match scenario {
            ScenarioId::Canonical => base,
            ScenarioId::EmptyRules => SimConfig {
                initial_counts: counts(&[("A", 3), ("B", 4)]),
                rules: ReactionSet::empty(),
                ..base
            },
            ScenarioId::StarvedRule => SimConfig {
                initial_counts: counts(&[("X", 0)]),
                rules: ReactionSet::new(vec![Reaction::new(["X"], "Y")])?,
                ..base
            },
            ScenarioId::Uniformity => SimConfig {
                steps: self.steps.max(MIN_UNIFORMITY_STEPS),
                initial_counts: counts(&[
                    ("A", 1_000_000),
                    ("B", 1_000_000),
                    ("C", 1_000_000),
                    ("D", 1_000_000),
                ]),
                rules: ReactionSet::new(vec![
                    Reaction::new(["A"], "B"),
                    Reaction::new(["B"], "A"),
                    Reaction::new(["C"], "D"),
                    Reaction::new(["D"], "C"),
                ])?,
                ..base
            },
            ScenarioId::Dimerization => SimConfig {
                initial_counts: counts(&[("A", 101)]),
                rules: ReactionSet::new(vec![Reaction::new(["A", "A"], "B")])?,
                ..base
            },
            ScenarioId::CatalystConservation => SimConfig {
                initial_counts: counts(&[("S", 1_000), ("K", 3)]),
                rules: ReactionSet::new(vec![Reaction::new(["S"], "P").catalyzed_by("K")])?,
                ..base
            },
        };
        Ok(config)
    }
}

fn counts(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
    pairs.iter().map(|(s, c)| (s.to_string(), *c)).collect()
}

fn count(counts: &SpeciesCounts, species: &str) -> i64 {
    counts.get(species).copied().unwrap_or(0) as i64
}

/// `A - B + C + E`, unchanged by every canonical rule.
fn canonical_invariant(counts: &SpeciesCounts) -> i64 {
    count(counts, "A") - count(counts, "B") + count(counts, "C") + count(counts, "E")
}

/// Checks the scenario's properties; returns every failed assertion.
fn check(scenario: ScenarioId, world: &PondWorld, initial: &PondSnapshot) -> Vec<String> {
    let pond = world.pond();
    let stats = world.stats();
    let now = pond.counts();
    let mut failures = Vec::new();

    match scenario {
        ScenarioId::Canonical => {
            let before = canonical_invariant(&initial.counts);
            let after = canonical_invariant(now);
            if before != after {
                failures.push(format!("A-B+C+E drifted from {} to {}", before, after));
            }
            if world.config().initial_counts == canonical_counts()
                && stats.fired.get(AUTOCATALYTIC_RULE).copied().unwrap_or(0) == 0
            {
                failures.push("autocatalytic rule never fired".to_string());
            }
            if stats.peak("E") <= initial.counts.get("E").copied().unwrap_or(0)
                && pond.steps_taken() >= 1_000
            {
                failures.push("E never grew above its seed count".to_string());
            }
            if let Err(reason) = check_event_format(pond.last_event(), pond.rules()) {
                failures.push(reason);
            }
        }
        ScenarioId::EmptyRules => {
            if now != &initial.counts {
                failures.push("counts changed with no rules".to_string());
            }
            if pond.steps_taken() > 0 && pond.last_event() != NO_REACTIONS_EVENT {
                failures.push(format!("unexpected last event {:?}", pond.last_event()));
            }
        }
        ScenarioId::StarvedRule => {
            if count(now, "X") != 0 || count(now, "Y") != 0 {
                failures.push(format!("expected {{X:0, Y:0}}, got {:?}", now));
            }
            if stats.total_fired() > 0 || pond.last_event() != INITIAL_EVENT {
                failures.push("starved rule fired".to_string());
            }
        }
        ScenarioId::Uniformity => {
            let n = stats.attempts as f64;
            let rules = stats.fired.len() as f64;
            let expected = n / rules;
            let sigma = (n * (1.0 / rules) * (1.0 - 1.0 / rules)).sqrt();
            for (rule, &fired) in stats.fired.iter().enumerate() {
                if (fired as f64 - expected).abs() > 5.0 * sigma + 1.0 {
                    failures.push(format!(
                        "rule {} fired {} times, expected ~{:.0}",
                        rule, fired, expected
                    ));
                }
            }
        }
        ScenarioId::Dimerization => {
            let a0 = count(&initial.counts, "A");
            let (a, b) = (count(now, "A"), count(now, "B"));
            if a + 2 * b != a0 {
                failures.push(format!("A + 2B = {} != {}", a + 2 * b, a0));
            }
            if pond.steps_taken() >= 1_000 && a != a0 % 2 {
                failures.push(format!("expected {} A left over, got {}", a0 % 2, a));
            }
        }
        ScenarioId::CatalystConservation => {
            if count(now, "K") != count(&initial.counts, "K") {
                failures.push(format!("catalyst K changed to {}", count(now, "K")));
            }
            if count(now, "S") + count(now, "P") != count(&initial.counts, "S") {
                failures.push("S + P not conserved".to_string());
            }
        }
    }

    failures
}

/// Checks `"Reaction: <r1[ + r2...]> -> <product>[ (Cat: <cat>)]"` against
/// the pond's own rules. The initial marker passes until something fires.
fn check_event_format(event: &str, rules: &ReactionSet) -> Result<(), String> {
    if event == INITIAL_EVENT {
        return Ok(());
    }
    let body = event
        .strip_prefix(REACTION_EVENT_PREFIX)
        .ok_or_else(|| format!("event {:?} lacks the reaction prefix", event))?;
    let reaction: Reaction = body
        .parse()
        .map_err(|e| format!("event {:?} does not parse: {}", event, e))?;
    if rules.iter().any(|r| r == &reaction) {
        Ok(())
    } else {
        Err(format!("event {:?} names no configured rule", event))
    }
}
