//! Data-Driven Boss Scripts
//!
//! Encounter timings, damage ranges and yell lines are data, not code: they
//! are loaded from `assets/config/encounters.ron` at startup and validated
//! before the first tick. The controller consumes a [`BossScript`] and never
//! hardcodes a timer value.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::constants;

/// Narrative lines a boss can emit. Stored as plain strings so encounter
/// writers can tune flavor without recompiling.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BossLines {
    /// Shouted when the boss engages.
    #[serde(default)]
    pub aggro: String,
    /// Occasionally shouted after killing a player.
    #[serde(default)]
    pub slay: String,
    /// Shouted on death.
    #[serde(default)]
    pub death: String,
    /// Emote when the hard-enrage timer fires.
    #[serde(default)]
    pub berserk: String,
    /// Emote when the low-health frenzy triggers.
    #[serde(default)]
    pub enrage: String,
}

/// Complete boss definition loaded from RON.
///
/// All timing fields are milliseconds; accessors expose them as `Duration`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BossScript {
    /// Display name of the boss.
    pub name: String,

    // === Special attack ===
    /// Period of the special melee attack in ms.
    #[serde(default = "default_special_attack_period_ms")]
    pub special_attack_period_ms: u64,
    /// Minimum special attack damage.
    pub special_attack_damage_min: f32,
    /// Maximum special attack damage.
    pub special_attack_damage_max: f32,

    // === Berserk phase ===
    /// Hard-enrage delay after engage in ms.
    #[serde(default = "default_berserk_delay_ms")]
    pub berserk_delay_ms: u64,
    /// Delay between berserk and the first bolt in ms.
    #[serde(default = "default_bolt_lead_in_ms")]
    pub bolt_lead_in_ms: u64,
    /// Bolt period in ms.
    #[serde(default = "default_bolt_period_ms")]
    pub bolt_period_ms: u64,
    /// Bolt cast time in ms (the boss counts as casting for this long).
    #[serde(default = "default_bolt_cast_time_ms")]
    pub bolt_cast_time_ms: u64,
    /// Damage each bolt deals to every raider.
    #[serde(default)]
    pub bolt_damage: f32,

    // === Low-health frenzy ===
    /// Health poll period in ms.
    #[serde(default = "default_health_check_period_ms")]
    pub health_check_period_ms: u64,
    /// Health fraction at or below which the frenzy fires (inclusive).
    #[serde(default = "default_enrage_health_fraction")]
    pub enrage_health_fraction: f32,

    // === Melee ===
    /// Boss auto-attack damage range.
    pub melee_damage_min: f32,
    pub melee_damage_max: f32,
    /// Boss auto-attacks per second.
    #[serde(default = "default_attack_speed")]
    pub attack_speed: f32,
    /// Boss maximum health.
    pub max_health: f32,

    // === Flavor ===
    /// Chance in [0, 1] to taunt after killing a player.
    #[serde(default = "default_slay_taunt_chance")]
    pub slay_taunt_chance: f32,
    #[serde(default)]
    pub lines: BossLines,
}

fn default_special_attack_period_ms() -> u64 {
    constants::SPECIAL_ATTACK_PERIOD.as_millis() as u64
}

fn default_berserk_delay_ms() -> u64 {
    constants::BERSERK_DELAY.as_millis() as u64
}

fn default_bolt_lead_in_ms() -> u64 {
    constants::BOLT_LEAD_IN.as_millis() as u64
}

fn default_bolt_period_ms() -> u64 {
    constants::BOLT_PERIOD.as_millis() as u64
}

fn default_bolt_cast_time_ms() -> u64 {
    constants::BOLT_CAST_TIME.as_millis() as u64
}

fn default_health_check_period_ms() -> u64 {
    constants::HEALTH_CHECK_PERIOD.as_millis() as u64
}

fn default_enrage_health_fraction() -> f32 {
    constants::ENRAGE_HEALTH_FRACTION
}

fn default_slay_taunt_chance() -> f32 {
    constants::SLAY_TAUNT_CHANCE
}

fn default_attack_speed() -> f32 {
    1.0
}

impl BossScript {
    pub fn special_attack_period(&self) -> Duration {
        Duration::from_millis(self.special_attack_period_ms)
    }

    pub fn berserk_delay(&self) -> Duration {
        Duration::from_millis(self.berserk_delay_ms)
    }

    pub fn bolt_lead_in(&self) -> Duration {
        Duration::from_millis(self.bolt_lead_in_ms)
    }

    pub fn bolt_period(&self) -> Duration {
        Duration::from_millis(self.bolt_period_ms)
    }

    pub fn bolt_cast_time(&self) -> Duration {
        Duration::from_millis(self.bolt_cast_time_ms)
    }

    pub fn health_check_period(&self) -> Duration {
        Duration::from_millis(self.health_check_period_ms)
    }

    /// Validate tuning values before the encounter starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("boss name must not be empty".to_string());
        }
        if self.special_attack_period_ms == 0 {
            return Err(format!(
                "{}: special_attack_period_ms must be positive",
                self.name
            ));
        }
        if self.special_attack_damage_min > self.special_attack_damage_max {
            return Err(format!(
                "{}: special attack damage range is inverted ({} > {})",
                self.name, self.special_attack_damage_min, self.special_attack_damage_max
            ));
        }
        if self.bolt_period_ms == 0 {
            return Err(format!("{}: bolt_period_ms must be positive", self.name));
        }
        if self.health_check_period_ms == 0 {
            return Err(format!(
                "{}: health_check_period_ms must be positive",
                self.name
            ));
        }
        if !(0.0..1.0).contains(&self.enrage_health_fraction) {
            return Err(format!(
                "{}: enrage_health_fraction {} must be in [0, 1)",
                self.name, self.enrage_health_fraction
            ));
        }
        if !(0.0..=1.0).contains(&self.slay_taunt_chance) {
            return Err(format!(
                "{}: slay_taunt_chance {} must be in [0, 1]",
                self.name, self.slay_taunt_chance
            ));
        }
        if self.max_health <= 0.0 {
            return Err(format!("{}: max_health must be positive", self.name));
        }
        if self.melee_damage_min > self.melee_damage_max {
            return Err(format!("{}: melee damage range is inverted", self.name));
        }
        if self.attack_speed <= 0.0 {
            return Err(format!("{}: attack_speed must be positive", self.name));
        }
        Ok(())
    }
}

/// Root structure for the encounters.ron file.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncountersConfig {
    pub encounters: HashMap<String, BossScript>,
}

/// Resource containing all boss definitions, keyed by encounter id.
#[derive(Resource)]
pub struct EncounterDefinitions {
    definitions: HashMap<String, BossScript>,
}

impl EncounterDefinitions {
    pub fn new(config: EncountersConfig) -> Self {
        Self {
            definitions: config.encounters,
        }
    }

    pub fn get(&self, encounter: &str) -> Option<&BossScript> {
        self.definitions.get(encounter)
    }

    pub fn encounter_ids(&self) -> impl Iterator<Item = &String> {
        self.definitions.keys()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Default path of the encounter definitions file.
pub const ENCOUNTERS_CONFIG_PATH: &str = "assets/config/encounters.ron";

/// Load and validate encounter definitions from a RON file.
pub fn load_encounter_definitions(path: &Path) -> Result<EncounterDefinitions, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let config: EncountersConfig = ron::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    if config.encounters.is_empty() {
        return Err(format!("{}: no encounters defined", path.display()));
    }
    for script in config.encounters.values() {
        script.validate()?;
    }

    let definitions = EncounterDefinitions::new(config);
    info!(
        "Loaded {} encounter definition(s) from {}",
        definitions.len(),
        path.display()
    );
    Ok(definitions)
}

/// Bevy plugin that loads encounter definitions at startup.
pub struct EncounterConfigPlugin;

impl Plugin for EncounterConfigPlugin {
    fn build(&self, app: &mut App) {
        match load_encounter_definitions(Path::new(ENCOUNTERS_CONFIG_PATH)) {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                // A simulator without boss scripts cannot do anything useful.
                panic!("Failed to load encounter definitions: {}", e);
            }
        }
    }
}

/// Boss script fixture shared by the encounter unit tests.
#[cfg(test)]
pub(crate) fn test_script() -> BossScript {
    BossScript {
        name: "Test Golem".to_string(),
        special_attack_period_ms: 2400,
        special_attack_damage_min: 22100.0,
        special_attack_damage_max: 22850.0,
        berserk_delay_ms: 420_000,
        bolt_lead_in_ms: 3000,
        bolt_period_ms: 3000,
        bolt_cast_time_ms: 1500,
        bolt_damage: 1500.0,
        health_check_period_ms: 1000,
        enrage_health_fraction: 0.05,
        melee_damage_min: 4000.0,
        melee_damage_max: 6000.0,
        attack_speed: 0.5,
        max_health: 4_000_000.0,
        slay_taunt_chance: 0.25,
        lines: BossLines::default(),
    }
}
