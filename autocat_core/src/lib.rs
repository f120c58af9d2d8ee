//! Autocat Core - Stochastic Reaction Engine for Autocatalytic Sets
//!
//! A small discrete-event chemistry: a closed set of named species, an
//! immutable list of reaction rules, and a [`Pond`] whose `step` picks one
//! rule uniformly at random and fires it if its reactants and catalyst
//! are available.
//!
//! Guarantees the engine keeps:
//! 1. **No negative counts**: a rule only fires when every reactant
//!    occurrence is covered
//! 2. **Catalysts are not consumed**: the catalyst role never mutates a count
//! 3. **Reproducibility**: the random source is injected and seedable
//!
//! # Usage
//!
//! ```
//! use autocat_core::{Pond, ReactionSet};
//!
//! let seed = [("A", 500), ("B", 500), ("C", 500), ("D", 0), ("E", 1)];
//! let mut pond = Pond::seeded(seed, ReactionSet::canonical(), 42).unwrap();
//!
//! for _ in 0..1_000 {
//!     pond.step();
//! }
//! println!("{} | E = {}", pond.last_event(), pond.count("E"));
//! ```

pub mod error;
pub mod pond;
pub mod reaction;
pub mod shared;

// Re-export key types for convenience
pub use error::ConfigError;
pub use pond::{Pond, PondSnapshot, SpeciesCounts, StepOutcome};
pub use pond::{INITIAL_EVENT, NO_REACTIONS_EVENT, REACTION_EVENT_PREFIX};
pub use reaction::{validate_species, Reaction, ReactionSet};
pub use shared::SharedPond;
