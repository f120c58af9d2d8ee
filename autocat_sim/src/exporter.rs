//! JSON exporter for external plotting or display.
//!
//! Records the pond once per tick so a viewer can replay the run without
//! linking the engine.

use crate::context::{SimContext, RUN_ID_STREAM};
use crate::stats::ReactionStats;
use crate::world::PondWorld;

use autocat_core::SpeciesCounts;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// A single observed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimFrame {
    pub tick: u64,

    /// Steps taken so far
    pub steps: u64,

    pub counts: SpeciesCounts,

    pub last_event: String,
}

impl SimFrame {
    pub fn capture(world: &PondWorld) -> Self {
        let pond = world.pond();
        Self {
            tick: world.tick_count(),
            steps: pond.steps_taken(),
            counts: pond.counts().clone(),
            last_event: pond.last_event().to_string(),
        }
    }
}

/// Complete run export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimExport {
    /// Run identifier, derived from the seed
    pub run_id: Uuid,

    /// Scenario or config label
    pub label: String,

    pub seed: u64,

    /// Rules in display notation
    pub rules: Vec<String>,

    pub frames: Vec<SimFrame>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ReactionStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominance_tick: Option<u64>,

    pub passed: bool,
}

impl SimExport {
    /// Creates an empty export for a run.
    pub fn new(label: &str, context: &SimContext, rules: Vec<String>) -> Self {
        let run_id = Uuid::from_u128(context.derive_rng(RUN_ID_STREAM).gen());
        Self {
            run_id,
            label: label.to_string(),
            seed: context.seed(),
            rules,
            frames: Vec::new(),
            stats: None,
            dominance_tick: None,
            passed: false,
        }
    }

    /// Creates an export labelled for `world`'s rules and seed.
    pub fn for_world(label: &str, world: &PondWorld) -> Self {
        let rules = world.pond().rules().iter().map(|r| r.to_string()).collect();
        Self::new(label, world.context(), rules)
    }

    pub fn add_frame(&mut self, frame: SimFrame) {
        self.frames.push(frame);
    }

    /// Stores final stats and the pass flag.
    pub fn finalize(&mut self, world: &PondWorld, passed: bool) {
        self.stats = Some(world.stats().clone());
        self.dominance_tick = world.dominance_tick();
        self.passed = passed;
    }

    pub fn final_counts(&self) -> Option<&SpeciesCounts> {
        self.frames.last().map(|f| &f.counts)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn exported_run(seed: u64) -> SimExport {
        let config = SimConfig::default().with_steps(1_000);
        let mut world = PondWorld::new(config, SimContext::new(seed)).unwrap();
        let mut export = SimExport::for_world("canonical", &world);
        world.run_observed(|w| export.add_frame(SimFrame::capture(w)));
        export.finalize(&world, true);
        export
    }

    #[test]
    fn test_one_frame_per_tick() {
        let export = exported_run(5);
        assert_eq!(export.frames.len(), 10);
        assert_eq!(export.frames[0].tick, 1);
        assert_eq!(export.frames[9].steps, 1_000);
        assert_eq!(export.rules[2], "D + A -> E (Cat: E)");
        assert_eq!(export.stats.as_ref().map(|s| s.attempts), Some(1_000));
    }

    #[test]
    fn test_run_id_follows_seed() {
        assert_eq!(exported_run(5).run_id, exported_run(5).run_id);
        assert_ne!(exported_run(5).run_id, exported_run(6).run_id);
    }

    #[test]
    fn test_write_to_file() {
        let export = exported_run(11);
        let path = std::env::temp_dir().join(format!("autocat_export_{}.json", std::process::id()));
        export.write_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let loaded: SimExport = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded, export);
        assert_eq!(loaded.final_counts(), export.final_counts());
    }
}
