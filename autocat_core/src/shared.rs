//! A pond behind one exclusive lock, for drivers that read and step
//! from different threads.

use crate::pond::{Pond, PondSnapshot, StepOutcome};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to a single locked pond.
///
/// Clones share state. Counts and the last event are always read and
/// written under the same lock, so a snapshot never mixes two steps.
pub struct SharedPond<R = ChaCha8Rng> {
    inner: Arc<Mutex<Pond<R>>>,
}

impl<R> Clone for SharedPond<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Rng> SharedPond<R> {
    pub fn new(pond: Pond<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pond)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Pond<R>> {
        // Poisoning means a step panicked mid-update.
        self.inner.lock().expect("pond lock poisoned")
    }

    pub fn step(&self) -> StepOutcome {
        self.lock().step()
    }

    /// Runs `n` steps under a single lock acquisition.
    pub fn step_many(&self, n: u64) -> u64 {
        self.lock().step_many(n)
    }

    pub fn snapshot(&self) -> PondSnapshot {
        self.lock().snapshot()
    }

    pub fn count(&self, species: &str) -> u64 {
        self.lock().count(species)
    }

    pub fn last_event(&self) -> String {
        self.lock().last_event().to_string()
    }
}
