//! PondWorld - a pond plus the periodic observer that drives it.
//!
//! A tick is a batch of `steps_per_tick` steps, the unit at which an
//! observer (display, exporter, test) looks at the pond.

use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::SimError;
use crate::stats::ReactionStats;

use autocat_core::{Pond, StepOutcome};
use tracing::{debug, info};

pub struct PondWorld {
    config: SimConfig,
    context: SimContext,
    pond: Pond,
    stats: ReactionStats,
    tick_count: u64,
    dominance_tick: Option<u64>,
}

impl PondWorld {
    /// Builds the pond described by `config`, seeded from `context`.
    pub fn new(config: SimConfig, context: SimContext) -> Result<Self, SimError> {
        if config.steps_per_tick == 0 {
            return Err(SimError::invalid("steps_per_tick must be at least 1"));
        }

        let pond = config.build_pond(&context)?;
        let stats = ReactionStats::new(pond.rules().len(), pond.counts());

        debug!(
            "PondWorld seed={} rules={} species={}",
            context.seed(),
            pond.rules().len(),
            pond.counts().len()
        );

        Ok(Self {
            config,
            context,
            pond,
            stats,
            tick_count: 0,
            dominance_tick: None,
        })
    }

    /// Runs one step and records it.
    pub fn step(&mut self) -> StepOutcome {
        let outcome = self.pond.step();
        self.stats.record(outcome, self.pond.counts());
        outcome
    }

    pub fn run_steps(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Runs one batch of steps and advances the tick counter.
    pub fn tick(&mut self) {
        self.run_steps(self.config.steps_per_tick);
        self.tick_count += 1;
        self.check_dominance();
    }

    /// Runs the configured number of steps, calling `on_tick` after every
    /// tick. A trailing partial batch also counts as a tick.
    pub fn run_observed(&mut self, mut on_tick: impl FnMut(&PondWorld)) {
        let mut remaining = self.config.steps;
        while remaining > 0 {
            let batch = remaining.min(self.config.steps_per_tick);
            self.run_steps(batch);
            self.tick_count += 1;
            self.check_dominance();
            remaining -= batch;
            on_tick(self);
        }
    }

    pub fn run(&mut self) {
        self.run_observed(|_| {});
    }

    fn check_dominance(&mut self) {
        if self.dominance_tick.is_some() || !self.dominance_reached() {
            return;
        }
        self.dominance_tick = Some(self.tick_count);
        info!(
            "Dominance: {} = {} at tick {}",
            self.config.dominance_species,
            self.pond.count(&self.config.dominance_species),
            self.tick_count
        );
    }

    /// Whether the watched species is currently above its threshold.
    pub fn dominance_reached(&self) -> bool {
        self.pond.count(&self.config.dominance_species) > self.config.dominance_threshold
    }

    /// First tick at which dominance was observed, if ever.
    pub fn dominance_tick(&self) -> Option<u64> {
        self.dominance_tick
    }

    pub fn pond(&self) -> &Pond {
        &self.pond
    }

    pub fn stats(&self) -> &ReactionStats {
        &self.stats
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn context(&self) -> &SimContext {
        &self.context
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocat_core::{Reaction, ReactionSet};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_world_creation() {
        let world = PondWorld::new(SimConfig::default(), SimContext::new(42)).unwrap();
        assert_eq!(world.tick_count(), 0);
        assert_eq!(world.stats().fired.len(), 4);
        assert_eq!(world.pond().count("A"), 500);
    }

    #[test]
    fn test_world_tick() {
        let mut world = PondWorld::new(SimConfig::default(), SimContext::new(42)).unwrap();
        world.tick();
        assert_eq!(world.tick_count(), 1);
        assert_eq!(world.pond().steps_taken(), 100);
        assert_eq!(world.stats().attempts, 100);
    }

    #[test]
    fn test_run_observed_partial_tick() {
        let config = SimConfig {
            steps: 250,
            ..Default::default()
        };
        let mut world = PondWorld::new(config, SimContext::new(1)).unwrap();

        let mut seen = Vec::new();
        world.run_observed(|w| seen.push(w.pond().steps_taken()));

        assert_eq!(seen, vec![100, 200, 250]);
        assert_eq!(world.tick_count(), 3);
    }

    #[test]
    fn test_zero_steps_per_tick_rejected() {
        let config = SimConfig {
            steps_per_tick: 0,
            ..Default::default()
        };
        assert!(matches!(
            PondWorld::new(config, SimContext::new(1)),
            Err(SimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_dominance_detected() {
        let config = SimConfig {
            steps: 1_000,
            steps_per_tick: 10,
            initial_counts: BTreeMap::from([("F".to_string(), 1_000)]),
            rules: ReactionSet::new(vec![Reaction::new(["F"], "E")]).unwrap(),
            dominance_threshold: 500,
            ..Default::default()
        };
        let mut world = PondWorld::new(config, SimContext::new(3)).unwrap();
        world.run();

        assert!(world.dominance_reached());
        // E passes 500 on the 501st fire, inside tick 51.
        assert_eq!(world.dominance_tick(), Some(51));
    }

    #[test]
    fn test_same_seed_same_world() {
        let config = SimConfig::default().with_steps(5_000);
        let mut a = PondWorld::new(config.clone(), SimContext::new(9)).unwrap();
        let mut b = PondWorld::new(config, SimContext::new(9)).unwrap();
        a.run();
        b.run();
        assert_eq!(a.pond().snapshot(), b.pond().snapshot());
        assert_eq!(a.stats(), b.stats());
    }

    proptest! {
        #[test]
        fn prop_ticks_cover_every_step(
            steps in 0u64..3_000,
            steps_per_tick in 1u64..500,
            seed in any::<u64>(),
        ) {
            let mut config = SimConfig::default().with_steps(steps);
            config.steps_per_tick = steps_per_tick;
            let mut world = PondWorld::new(config, SimContext::new(seed)).unwrap();

            let mut observed = 0u64;
            let mut last_seen = 0u64;
            world.run_observed(|w| {
                observed += 1;
                assert!(w.pond().steps_taken() > last_seen);
                last_seen = w.pond().steps_taken();
            });

            let expected_ticks = steps.div_ceil(steps_per_tick);
            prop_assert_eq!(observed, expected_ticks);
            prop_assert_eq!(world.tick_count(), expected_ticks);
            prop_assert_eq!(world.pond().steps_taken(), steps);
            prop_assert_eq!(world.stats().attempts, steps);
        }
    }
}
