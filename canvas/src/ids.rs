//! Entity id generation.
//!
//! Ids are short base-36 strings. Uniqueness is probabilistic; the reducer
//! additionally retries against the ids already in the document.

#[cfg(test)]
#[path = "ids_test.rs"]
mod ids_test;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::consts::ID_LEN;
use crate::doc::EntityId;

/// Supplies fresh entity ids to the reducer.
pub trait IdSource {
    fn next_id(&mut self) -> EntityId;
}

/// Random base-36 ids backed by a seedable RNG.
#[derive(Debug, Clone)]
pub struct RandomIds {
    rng: StdRng,
}

impl RandomIds {
    /// Seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Deterministic sequence, for replay and tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for RandomIds {
    fn next_id(&mut self) -> EntityId {
        let id: String = (0..ID_LEN)
            .map(|_| char::from_digit(self.rng.random_range(0..36), 36).unwrap_or('0'))
            .collect();
        EntityId::new(id)
    }
}

/// Predictable `prefix-N` ids.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: 1 }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> EntityId {
        let id = EntityId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
