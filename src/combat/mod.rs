//! Combat plumbing shared by the simulation: event definitions and the
//! combat log.

pub mod events;
pub mod log;

use bevy::prelude::*;

use events::{AbilityUsedEvent, BossYellEvent, CombatantDeathEvent, DamageEvent};
use log::CombatLog;

/// Registers combat events and the combat log resource.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageEvent>()
            .add_event::<AbilityUsedEvent>()
            .add_event::<BossYellEvent>()
            .add_event::<CombatantDeathEvent>()
            .init_resource::<CombatLog>();
    }
}
