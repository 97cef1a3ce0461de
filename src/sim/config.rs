//! JSON configuration parsing for headless runs
//!
//! Parses JSON encounter configurations and resolves them against the loaded
//! boss definitions into an [`EncounterSetup`].

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::encounter::script::{BossScript, EncounterDefinitions};

/// Resolved per-run setup: the boss script plus the raid composition.
#[derive(Resource, Clone, Debug)]
pub struct EncounterSetup {
    pub script: BossScript,
    pub tanks: usize,
    pub melee: usize,
    pub ranged: usize,
}

/// Headless encounter configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessEncounterConfig {
    /// Encounter id, a key in encounters.ron (e.g. "flesh_golem")
    pub encounter: String,
    /// Number of tanks in the raid (default: 2)
    #[serde(default = "default_tanks")]
    pub tanks: usize,
    /// Number of melee damage dealers (default: 10)
    #[serde(default = "default_melee")]
    pub melee: usize,
    /// Number of ranged damage dealers (default: 8)
    #[serde(default = "default_ranged")]
    pub ranged: usize,
    /// Custom output path for the encounter log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Maximum encounter duration in seconds (default: 600)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic encounter reproduction
    /// If provided, the run will use a seeded RNG for reproducible results
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_tanks() -> usize {
    2
}

fn default_melee() -> usize {
    10
}

fn default_ranged() -> usize {
    8
}

fn default_max_duration() -> f32 {
    600.0
}

impl HeadlessEncounterConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessEncounterConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.encounter.is_empty() {
            return Err("encounter id must not be empty".to_string());
        }
        let raid_size = self.tanks + self.melee + self.ranged;
        if raid_size == 0 {
            return Err("raid must have at least one member".to_string());
        }
        if raid_size > 40 {
            return Err(format!(
                "raid size {} exceeds the 40-player cap",
                raid_size
            ));
        }
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }
        Ok(())
    }

    /// Resolve the encounter id against the loaded definitions.
    pub fn to_encounter_setup(
        &self,
        definitions: &EncounterDefinitions,
    ) -> Result<EncounterSetup, String> {
        let script = definitions.get(&self.encounter).ok_or_else(|| {
            let mut known: Vec<&str> = definitions.encounter_ids().map(|s| s.as_str()).collect();
            known.sort_unstable();
            format!(
                "Unknown encounter '{}' (known: {})",
                self.encounter,
                known.join(", ")
            )
        })?;

        Ok(EncounterSetup {
            script: script.clone(),
            tanks: self.tanks,
            melee: self.melee,
            ranged: self.ranged,
        })
    }
}
