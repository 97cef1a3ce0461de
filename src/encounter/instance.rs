//! Shared Instance State
//!
//! Raid-wide flags that outlive a single boss attempt (for example the
//! "nobody may die" challenge flag). Modeled as an explicit key/value handle
//! passed into the controller rather than ambient global state, so the
//! controller stays testable in isolation.

use std::collections::HashMap;

use bevy::prelude::*;

/// Key under which a player death during the encounter is recorded.
pub const DATA_NO_DEATH_FAILED: &str = "no_death_failed";

/// Key/value store for instance-wide persistent flags.
pub trait InstanceStore {
    fn set(&mut self, key: &str, value: u32);
    fn get(&self, key: &str) -> Option<u32>;
}

/// In-memory instance state for the simulator. A real server would back this
/// with its instance-save persistence.
#[derive(Resource, Default)]
pub struct InstanceState {
    data: HashMap<String, u32>,
}

impl InstanceStore for InstanceState {
    fn set(&mut self, key: &str, value: u32) {
        self.data.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<u32> {
        self.data.get(key).copied()
    }
}

impl InstanceState {
    /// Whether the no-death challenge has been failed this instance.
    pub fn no_death_failed(&self) -> bool {
        self.get(DATA_NO_DEATH_FAILED) == Some(1)
    }
}
