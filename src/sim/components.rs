//! Simulation Components
//!
//! ECS components and resources for the headless encounter: the boss, the
//! raid group fighting it, and the encounter-wide state.

use bevy::prelude::*;

use crate::combat::log::EncounterOutcome;
use crate::encounter::controller::BossController;
use crate::encounter::script::BossScript;

/// Raid roles. Stats and positioning differ per role; none of them heal -
/// the raid races the boss's enrage timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaiderRole {
    /// Holds top threat in melee range, takes the boss's swings.
    Tank,
    /// Melee damage, stands in range of the special attack.
    Melee,
    /// Ranged damage, out of melee range.
    Ranged,
}

impl RaiderRole {
    pub fn name(&self) -> &'static str {
        match self {
            RaiderRole::Tank => "Tank",
            RaiderRole::Melee => "Melee",
            RaiderRole::Ranged => "Ranged",
        }
    }
}

/// One raid member.
#[derive(Component, Clone)]
pub struct Raider {
    /// Display name, e.g. "Tank 1"
    pub name: String,
    pub role: RaiderRole,
    pub max_health: f32,
    pub current_health: f32,
    /// Auto-attack damage range
    pub attack_damage_min: f32,
    pub attack_damage_max: f32,
    /// Attacks per second
    pub attack_speed: f32,
    /// Timer tracking time until next attack
    pub attack_timer: f32,
    /// Accumulated threat against the boss
    pub threat: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    /// Set once the death has been announced and processed
    pub death_processed: bool,
}

impl Raider {
    /// Create a raider with role-specific stats.
    pub fn new(role: RaiderRole, slot: usize) -> Self {
        // Role stats: (health, damage min, damage max, attacks per second)
        let (max_health, dmg_min, dmg_max, attack_speed) = match role {
            RaiderRole::Tank => (120_000.0, 400.0, 600.0, 1.0),
            RaiderRole::Melee => (80_000.0, 900.0, 1300.0, 1.0),
            RaiderRole::Ranged => (70_000.0, 850.0, 1250.0, 0.8),
        };

        Self {
            name: format!("{} {}", role.name(), slot),
            role,
            max_health,
            current_health: max_health,
            attack_damage_min: dmg_min,
            attack_damage_max: dmg_max,
            attack_speed,
            attack_timer: 0.0,
            threat: 0.0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
            death_processed: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    /// Debug-build invariant checks, run after state mutation.
    #[inline]
    pub fn debug_validate(&self) {
        debug_assert!(
            self.current_health >= 0.0,
            "raider health cannot be negative: {}",
            self.current_health
        );
        debug_assert!(
            self.current_health <= self.max_health,
            "raider health ({}) cannot exceed max ({})",
            self.current_health,
            self.max_health
        );
        debug_assert!(self.threat >= 0.0, "threat cannot be negative");
    }
}

/// Boss combat state. The AI lives in [`BossAi`]; this holds the body.
#[derive(Component)]
pub struct Boss {
    pub name: String,
    pub max_health: f32,
    pub current_health: f32,
    /// Timer tracking time until next melee swing
    pub attack_timer: f32,
    /// Current primary target
    pub victim: Option<Entity>,
    /// Hard-enrage buff active
    pub berserk: bool,
    /// Low-health frenzy buff active
    pub frenzied: bool,
    /// Remaining cast time of an in-flight bolt, if any. While `Some`, the
    /// boss counts as casting and the AI defers event dispatch.
    pub cast_time_remaining: Option<f32>,
    pub damage_dealt: f32,
    /// Most recent raider to land a hit, used for kill attribution
    pub last_attacker: Option<Entity>,
    /// Set once the death has been announced and processed
    pub death_processed: bool,
}

impl Boss {
    pub fn new(script: &BossScript) -> Self {
        Self {
            name: script.name.clone(),
            max_health: script.max_health,
            current_health: script.max_health,
            attack_timer: 0.0,
            victim: None,
            berserk: false,
            frenzied: false,
            cast_time_remaining: None,
            damage_dealt: 0.0,
            last_attacker: None,
            death_processed: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    pub fn is_casting(&self) -> bool {
        self.cast_time_remaining.is_some()
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.current_health / self.max_health
        } else {
            0.0
        }
    }

    /// Outgoing melee damage multiplier from active enrage buffs.
    pub fn damage_multiplier(&self) -> f32 {
        use crate::encounter::constants::{BERSERK_DAMAGE_MULTIPLIER, FRENZY_DAMAGE_MULTIPLIER};
        let mut mult = 1.0;
        if self.berserk {
            mult *= BERSERK_DAMAGE_MULTIPLIER;
        }
        if self.frenzied {
            mult *= FRENZY_DAMAGE_MULTIPLIER;
        }
        mult
    }
}

/// The boss's AI controller, attached alongside [`Boss`].
#[derive(Component)]
pub struct BossAi {
    pub controller: BossController,
}

/// Encounter-wide state.
#[derive(Resource, Default)]
pub struct EncounterState {
    /// Whether the boss has been engaged
    pub engaged: bool,
    /// Seconds since engage
    pub elapsed: f32,
    /// Set when the encounter ends, one way or another
    pub outcome: Option<EncounterOutcome>,
}
