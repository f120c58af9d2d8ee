//! Autocat headless simulation harness
//!
//! Runs the autocatalytic pond without any display: a seeded
//! [`PondWorld`] steps the pond in ticks, collects [`ReactionStats`],
//! optionally records frames into a [`SimExport`], and the
//! [`ScenarioRunner`] checks named properties against the result.
//!
//! # Determinism
//!
//! All randomness derives from one 64-bit seed through [`SimContext`].
//! Re-running with the seed printed by a failing run reproduces it
//! step for step.
//!
//! # Usage
//!
//! ```ignore
//! use autocat_sim::{PondWorld, SimConfig, SimContext};
//!
//! let mut world = PondWorld::new(SimConfig::default(), SimContext::new(42))?;
//! world.run();
//! println!("{}", world.pond().last_event());
//! ```

mod context;
mod config;
mod error;
mod exporter;
mod runner;
mod stats;
mod world;
pub mod scenarios;

pub use context::SimContext;
pub use config::{canonical_counts, SimConfig};
pub use error::SimError;
pub use exporter::{SimExport, SimFrame};
pub use runner::{ScenarioResult, ScenarioRunner};
pub use stats::ReactionStats;
pub use world::PondWorld;
