//! Combat events
//!
//! Defines the events that occur during an encounter for logging and
//! processing. The boss AI never sends these directly; the simulation systems
//! translate its [`TickActions`](crate::encounter::controller::TickActions)
//! and the raiders' swings into events.

use bevy::prelude::*;

/// Event fired when damage is dealt
#[derive(Event)]
pub struct DamageEvent {
    /// Entity dealing the damage
    pub source: Entity,
    /// Entity receiving the damage
    pub target: Entity,
    /// Amount of damage
    pub amount: f32,
    /// Name of the ability that caused the damage (None for auto-attack)
    pub ability_name: Option<String>,
}

/// Event fired when the boss invokes an ability
#[derive(Event)]
pub struct AbilityUsedEvent {
    /// Entity using the ability
    pub caster: Entity,
    /// Target of the ability (None for self-casts)
    pub target: Option<Entity>,
    /// Name of the ability
    pub ability_name: String,
}

/// Whether a scripted line is spoken or acted out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YellKind {
    Yell,
    Emote,
}

/// Event fired when the boss yells or emotes a scripted line
#[derive(Event)]
pub struct BossYellEvent {
    /// Entity speaking
    pub speaker: Entity,
    /// Resolved line text from the boss script
    pub text: String,
    pub kind: YellKind,
}

/// Event fired when a combatant dies
#[derive(Event)]
pub struct CombatantDeathEvent {
    /// Entity that died
    pub victim: Entity,
    /// Entity that dealt the killing blow
    pub killer: Entity,
}
