//! Threat Snapshot & Target Selection
//!
//! The simulation driver hands the boss AI a read-only, descending-ordered
//! threat list each tick. The controller never mutates it; it only selects
//! targets from it. Threat generation itself lives in the driver.

use bevy::prelude::*;

/// One candidate target in the per-tick threat snapshot.
///
/// Entries arrive ordered by descending threat. Melee-range membership is
/// computed externally (the core has no notion of positions).
#[derive(Clone, Copy, Debug)]
pub struct ThreatEntry {
    pub target: Entity,
    pub threat: f32,
    pub in_melee_range: bool,
}

/// Pick the target for the boss's periodic special attack.
///
/// Precedence, per the encounter design:
/// 1. the *second*-highest threat entry among those in melee range
///    (the tank soaks top threat; the strike punishes the next in line);
/// 2. the sole melee-range entry, if only one exists;
/// 3. the current victim, if it is in melee range;
/// 4. nobody - the caller skips the strike this cycle but still reschedules.
pub fn select_special_attack_target(
    snapshot: &[ThreatEntry],
    victim: Option<Entity>,
    victim_in_melee_range: bool,
) -> Option<Entity> {
    let mut melee = snapshot.iter().filter(|e| e.in_melee_range);

    let first = melee.next();
    let second = melee.next();

    match (first, second) {
        (Some(_), Some(e)) => Some(e.target),
        (Some(e), None) => Some(e.target),
        _ => victim.filter(|_| victim_in_melee_range),
    }
}

/// Debug check that a snapshot honors the descending-threat contract.
pub fn debug_validate_snapshot(snapshot: &[ThreatEntry]) {
    debug_assert!(
        snapshot.windows(2).all(|w| w[0].threat >= w[1].threat),
        "threat snapshot must be ordered by descending threat"
    );
}
