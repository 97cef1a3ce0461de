//! Boss Encounter Core
//!
//! The reusable AI core driving a single boss entity:
//!
//! - [`scheduler`] — timed-event scheduler (pending named events, one due
//!   event dispatched per tick).
//! - [`controller`] — the boss combat controller built on top of it: target
//!   selection, ability invocation, enrage phases.
//! - [`threat`] — read-only threat snapshot types and target selection.
//! - [`script`] — data-driven boss definitions (RON).
//! - [`instance`] — shared instance-wide flag store.
//!
//! Nothing in this module reads the ECS directly; the simulation driver in
//! [`crate::sim`] assembles inputs and applies outputs.

pub mod constants;
pub mod controller;
pub mod instance;
pub mod scheduler;
pub mod script;
pub mod threat;

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Seeded random number generator for deterministic encounter simulation.
///
/// Injected into the controller rather than reached for globally, so a fixed
/// seed reproduces an entire encounter (damage rolls, taunt rolls) exactly.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Roll against a probability in [0, 1]. A chance of 1.0 always succeeds.
    pub fn roll(&mut self, chance: f32) -> bool {
        chance >= 1.0 || self.random_f32() < chance
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
