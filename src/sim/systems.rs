//! Encounter Simulation Systems
//!
//! The ECS driver around the boss controller. Each frame the systems run in a
//! fixed phase order: engage, cast resolution, combat actions, damage
//! resolution, death resolution, logging. The boss AI itself never touches
//! the ECS; [`boss_ai_tick`] assembles its [`TickInput`] snapshot and
//! translates the returned [`TickActions`] into events.

use std::cmp::Ordering;

use bevy::prelude::*;

use crate::combat::events::{
    AbilityUsedEvent, BossYellEvent, CombatantDeathEvent, DamageEvent, YellKind,
};
use crate::combat::log::{CombatLog, CombatLogEventType, EncounterOutcome};
use crate::encounter::constants::{MELEE_RANGE, TANK_THREAT_MULTIPLIER};
use crate::encounter::controller::{AbilityTarget, BossAbility, LineKind, TickInput};
use crate::encounter::instance::InstanceState;
use crate::encounter::threat::ThreatEntry;
use crate::encounter::GameRng;

use super::components::{Boss, BossAi, EncounterState, Raider, RaiderRole};
use super::config::EncounterSetup;

/// Phases of the per-frame encounter pipeline, executed in order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum EncounterSystemPhase {
    /// Engage the boss on the first frame a target exists.
    Engage,
    /// Advance the encounter clock and resolve in-flight casts.
    Casting,
    /// Raider swings and the boss AI tick.
    Actions,
    /// Apply queued damage events to health pools.
    DamageResolution,
    /// Announce deaths and settle the encounter outcome.
    DeathResolution,
    /// Record everything that happened this frame.
    Logging,
}

/// Configure the phase ordering for the encounter systems.
pub fn configure_encounter_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            EncounterSystemPhase::Engage,
            EncounterSystemPhase::Casting,
            EncounterSystemPhase::Actions,
            EncounterSystemPhase::DamageResolution,
            EncounterSystemPhase::DeathResolution,
            EncounterSystemPhase::Logging,
        )
            .chain(),
    );
}

/// Add the core encounter systems in their phases.
pub fn add_core_encounter_systems(app: &mut App) {
    app.add_systems(
        Update,
        (engage_boss, advance_encounter_clock)
            .chain()
            .in_set(EncounterSystemPhase::Engage),
    )
    .add_systems(
        Update,
        update_boss_cast.in_set(EncounterSystemPhase::Casting),
    )
    .add_systems(
        Update,
        (raider_auto_attack, boss_ai_tick)
            .chain()
            .in_set(EncounterSystemPhase::Actions),
    )
    .add_systems(
        Update,
        apply_damage_events.in_set(EncounterSystemPhase::DamageResolution),
    )
    .add_systems(
        Update,
        resolve_deaths.in_set(EncounterSystemPhase::DeathResolution),
    )
    .add_systems(
        Update,
        record_combat_log.in_set(EncounterSystemPhase::Logging),
    );
}

/// Display names for the boss's abilities, used in events and the log.
pub fn ability_display_name(ability: BossAbility) -> &'static str {
    match ability {
        BossAbility::SpecialStrike => "Hateful Strike",
        BossAbility::Berserk => "Berserk",
        BossAbility::Bolt => "Slime Bolt",
        BossAbility::Frenzy => "Frenzy",
    }
}

fn yell_kind(line: LineKind) -> YellKind {
    match line {
        LineKind::Aggro | LineKind::Slay | LineKind::Death => YellKind::Yell,
        LineKind::BerserkEmote | LineKind::EnrageEmote => YellKind::Emote,
    }
}

/// Build the spawn set for a raid group: tanks and melee in an inner ring
/// within melee range of the boss, ranged on an outer ring.
pub fn raider_spawns(setup: &EncounterSetup) -> Vec<(Transform, Raider)> {
    let mut spawns = Vec::new();

    let inner_count = setup.tanks + setup.melee;
    let mut inner_slot = 0usize;
    let mut place_inner = |raider: Raider, spawns: &mut Vec<(Transform, Raider)>| {
        let angle = inner_slot as f32 / inner_count.max(1) as f32 * std::f32::consts::TAU;
        inner_slot += 1;
        let radius = 1.5;
        spawns.push((
            Transform::from_xyz(radius * angle.cos(), 0.0, radius * angle.sin()),
            raider,
        ));
    };

    for slot in 1..=setup.tanks {
        let mut raider = Raider::new(RaiderRole::Tank, slot);
        // Tanks open with an established threat lead so the boss faces them
        // from the first tick.
        raider.threat = 1000.0;
        place_inner(raider, &mut spawns);
    }
    for slot in 1..=setup.melee {
        place_inner(Raider::new(RaiderRole::Melee, slot), &mut spawns);
    }

    for slot in 1..=setup.ranged {
        let angle = slot as f32 / setup.ranged.max(1) as f32 * std::f32::consts::TAU;
        let radius = 25.0;
        spawns.push((
            Transform::from_xyz(radius * angle.cos(), 0.0, radius * angle.sin()),
            Raider::new(RaiderRole::Ranged, slot),
        ));
    }

    spawns
}

/// Engage the boss once a live target exists: pick the top-threat raider,
/// run the controller's engage hook and announce the pull.
fn engage_boss(
    mut state: ResMut<EncounterState>,
    mut boss_query: Query<(Entity, &mut Boss, &mut BossAi)>,
    raiders: Query<(Entity, &Raider), Without<Boss>>,
    mut yell_events: EventWriter<BossYellEvent>,
    mut combat_log: ResMut<CombatLog>,
) {
    if state.engaged {
        return;
    }
    let Ok((boss_entity, mut boss, mut ai)) = boss_query.get_single_mut() else {
        return;
    };

    let victim = raiders
        .iter()
        .filter(|(_, r)| r.is_alive())
        .max_by(|a, b| {
            a.1.threat
                .partial_cmp(&b.1.threat)
                .unwrap_or(Ordering::Equal)
        })
        .map(|(entity, _)| entity);
    let Some(victim) = victim else {
        return;
    };

    boss.victim = Some(victim);
    state.engaged = true;

    let actions = ai.controller.on_engage();
    for line in &actions.lines {
        yell_events.send(BossYellEvent {
            speaker: boss_entity,
            text: ai.controller.line_text(*line).to_string(),
            kind: yell_kind(*line),
        });
    }

    combat_log.log(
        CombatLogEventType::EncounterEvent,
        format!("{} engaged!", boss.name),
    );
}

/// Advance the encounter clock while the fight is live.
fn advance_encounter_clock(
    time: Res<Time>,
    mut state: ResMut<EncounterState>,
    mut combat_log: ResMut<CombatLog>,
) {
    if !state.engaged || state.outcome.is_some() {
        return;
    }
    state.elapsed += time.delta_secs();
    combat_log.encounter_time = state.elapsed;
}

/// Tick down an in-flight bolt cast. On completion the bolt lands on every
/// living raider; being out of melee range is no protection from it.
fn update_boss_cast(
    time: Res<Time>,
    state: Res<EncounterState>,
    mut boss_query: Query<(Entity, &mut Boss, &BossAi)>,
    raiders: Query<(Entity, &Raider), Without<Boss>>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    if !state.engaged || state.outcome.is_some() {
        return;
    }
    let Ok((boss_entity, mut boss, ai)) = boss_query.get_single_mut() else {
        return;
    };
    let Some(remaining) = boss.cast_time_remaining else {
        return;
    };

    let remaining = remaining - time.delta_secs();
    if remaining > 0.0 {
        boss.cast_time_remaining = Some(remaining);
        return;
    }
    boss.cast_time_remaining = None;

    let bolt_damage = ai.controller.script().bolt_damage;
    let bolt_name = ability_display_name(BossAbility::Bolt);
    for (entity, raider) in raiders.iter() {
        if !raider.is_alive() {
            continue;
        }
        damage_events.send(DamageEvent {
            source: boss_entity,
            target: entity,
            amount: bolt_damage,
            ability_name: Some(bolt_name.to_string()),
        });
    }
}

/// Raider auto-attacks against the boss. Melee roles must be in range;
/// ranged raiders attack from anywhere. Every hit generates threat, with
/// tanks generating bonus threat.
fn raider_auto_attack(
    time: Res<Time>,
    state: Res<EncounterState>,
    mut rng: ResMut<GameRng>,
    mut raiders: Query<(Entity, &mut Raider, &Transform), Without<Boss>>,
    boss_query: Query<(Entity, &Boss, &Transform)>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    if !state.engaged || state.outcome.is_some() {
        return;
    }
    let Ok((boss_entity, boss, boss_transform)) = boss_query.get_single() else {
        return;
    };
    if !boss.is_alive() {
        return;
    }

    let dt = time.delta_secs();
    for (entity, mut raider, transform) in &mut raiders {
        if !raider.is_alive() {
            continue;
        }

        raider.attack_timer += dt;
        let interval = 1.0 / raider.attack_speed;
        if raider.attack_timer < interval {
            continue;
        }

        let in_range = raider.role == RaiderRole::Ranged
            || transform
                .translation
                .distance(boss_transform.translation)
                <= MELEE_RANGE;
        if !in_range {
            // Hold the swing ready until back in range.
            raider.attack_timer = interval;
            continue;
        }
        raider.attack_timer -= interval;

        let damage = rng.random_range(raider.attack_damage_min, raider.attack_damage_max);
        let threat_multiplier = if raider.role == RaiderRole::Tank {
            TANK_THREAT_MULTIPLIER
        } else {
            1.0
        };
        raider.threat += damage * threat_multiplier;
        raider.debug_validate();

        damage_events.send(DamageEvent {
            source: entity,
            target: boss_entity,
            amount: damage,
            ability_name: None,
        });
    }
}

/// The boss AI tick: build the threat snapshot, run the controller, apply
/// its actions as events and buffs.
fn boss_ai_tick(
    time: Res<Time>,
    state: Res<EncounterState>,
    mut rng: ResMut<GameRng>,
    mut boss_query: Query<(Entity, &mut Boss, &mut BossAi, &Transform)>,
    raiders: Query<(Entity, &Raider, &Transform), Without<Boss>>,
    mut damage_events: EventWriter<DamageEvent>,
    mut ability_events: EventWriter<AbilityUsedEvent>,
    mut yell_events: EventWriter<BossYellEvent>,
) {
    if !state.engaged || state.outcome.is_some() {
        return;
    }
    let Ok((boss_entity, mut boss, mut ai, boss_transform)) = boss_query.get_single_mut() else {
        return;
    };
    if !boss.is_alive() {
        return;
    }

    // Threat snapshot in descending order, entity id breaking exact ties.
    let mut snapshot: Vec<ThreatEntry> = raiders
        .iter()
        .filter(|(_, raider, _)| raider.is_alive())
        .map(|(entity, raider, transform)| ThreatEntry {
            target: entity,
            threat: raider.threat,
            in_melee_range: transform
                .translation
                .distance(boss_transform.translation)
                <= MELEE_RANGE,
        })
        .collect();
    snapshot.sort_by(|a, b| {
        b.threat
            .partial_cmp(&a.threat)
            .unwrap_or(Ordering::Equal)
            .then(a.target.cmp(&b.target))
    });

    // Highest threat holds aggro.
    boss.victim = snapshot.first().map(|entry| entry.target);
    let victim_in_melee_range = snapshot
        .first()
        .map(|entry| entry.in_melee_range)
        .unwrap_or(false);

    let input = TickInput {
        elapsed: time.delta(),
        threat: &snapshot,
        health_fraction: boss.health_fraction(),
        is_casting: boss.is_casting(),
        victim: boss.victim,
        victim_in_melee_range,
    };
    let actions = ai.controller.on_tick(&input, &mut rng);

    for line in &actions.lines {
        yell_events.send(BossYellEvent {
            speaker: boss_entity,
            text: ai.controller.line_text(*line).to_string(),
            kind: yell_kind(*line),
        });
    }

    if let Some(ability_use) = actions.ability {
        let ability_name = ability_display_name(ability_use.ability);
        let target = match ability_use.target {
            AbilityTarget::Unit(entity) => Some(entity),
            AbilityTarget::SelfCast => None,
        };
        ability_events.send(AbilityUsedEvent {
            caster: boss_entity,
            target,
            ability_name: ability_name.to_string(),
        });

        match ability_use.ability {
            BossAbility::SpecialStrike => {
                if let Some(target) = target {
                    damage_events.send(DamageEvent {
                        source: boss_entity,
                        target,
                        amount: ability_use.damage.unwrap_or_default(),
                        ability_name: Some(ability_name.to_string()),
                    });
                }
            }
            BossAbility::Berserk => {
                boss.berserk = true;
            }
            BossAbility::Bolt => {
                boss.cast_time_remaining =
                    Some(ai.controller.script().bolt_cast_time().as_secs_f32());
            }
            BossAbility::Frenzy => {
                boss.frenzied = true;
            }
        }
    }

    if actions.attempt_melee {
        let script = ai.controller.script();
        let interval = 1.0 / script.attack_speed;
        boss.attack_timer = (boss.attack_timer + time.delta_secs()).min(interval);
        if boss.attack_timer >= interval && victim_in_melee_range {
            if let Some(victim) = boss.victim {
                boss.attack_timer = 0.0;
                let damage = rng.random_range(script.melee_damage_min, script.melee_damage_max)
                    * boss.damage_multiplier();
                damage_events.send(DamageEvent {
                    source: boss_entity,
                    target: victim,
                    amount: damage,
                    ability_name: None,
                });
            }
        }
    }
}

/// Apply queued damage events to health pools and dealt/taken tallies.
fn apply_damage_events(
    mut damage_events: EventReader<DamageEvent>,
    mut boss_query: Query<&mut Boss>,
    mut raiders: Query<&mut Raider, Without<Boss>>,
) {
    for event in damage_events.read() {
        if let Ok(mut boss) = boss_query.get_mut(event.target) {
            boss.current_health = (boss.current_health - event.amount).max(0.0);
            boss.last_attacker = Some(event.source);
            if let Ok(mut raider) = raiders.get_mut(event.source) {
                raider.damage_dealt += event.amount;
            }
        } else if let Ok(mut raider) = raiders.get_mut(event.target) {
            raider.current_health = (raider.current_health - event.amount).max(0.0);
            raider.damage_taken += event.amount;
            raider.debug_validate();
            if let Ok(mut boss) = boss_query.get_mut(event.source) {
                boss.damage_dealt += event.amount;
            }
        }
    }
}

/// Announce deaths, notify the boss AI of player kills, and settle the
/// encounter outcome when one side is eliminated.
fn resolve_deaths(
    mut state: ResMut<EncounterState>,
    mut instance: ResMut<InstanceState>,
    mut rng: ResMut<GameRng>,
    mut boss_query: Query<(Entity, &mut Boss, &mut BossAi)>,
    mut raiders: Query<(Entity, &mut Raider), Without<Boss>>,
    mut death_events: EventWriter<CombatantDeathEvent>,
    mut yell_events: EventWriter<BossYellEvent>,
    mut combat_log: ResMut<CombatLog>,
) {
    if !state.engaged || state.outcome.is_some() {
        return;
    }
    let Ok((boss_entity, mut boss, mut ai)) = boss_query.get_single_mut() else {
        return;
    };

    for (entity, mut raider) in &mut raiders {
        if raider.is_alive() || raider.death_processed {
            continue;
        }
        raider.death_processed = true;
        death_events.send(CombatantDeathEvent {
            victim: entity,
            killer: boss_entity,
        });
        if boss.victim == Some(entity) {
            boss.victim = None;
        }
        if let Some(line) = ai.controller.on_victim_killed(true, &mut *instance, &mut rng) {
            yell_events.send(BossYellEvent {
                speaker: boss_entity,
                text: ai.controller.line_text(line).to_string(),
                kind: yell_kind(line),
            });
        }
    }

    if !boss.is_alive() && !boss.death_processed {
        boss.death_processed = true;
        let line = ai.controller.on_death();
        yell_events.send(BossYellEvent {
            speaker: boss_entity,
            text: ai.controller.line_text(line).to_string(),
            kind: yell_kind(line),
        });
        death_events.send(CombatantDeathEvent {
            victim: boss_entity,
            killer: boss.last_attacker.unwrap_or(boss_entity),
        });
        ai.controller.reset();
        state.outcome = Some(EncounterOutcome::Kill);
        combat_log.log(
            CombatLogEventType::EncounterEvent,
            format!("{} has been defeated!", boss.name),
        );
        return;
    }

    if raiders.iter().all(|(_, raider)| !raider.is_alive()) {
        ai.controller.reset();
        state.outcome = Some(EncounterOutcome::Wipe);
        combat_log.log(
            CombatLogEventType::EncounterEvent,
            "The raid has been wiped out.".to_string(),
        );
    }
}

fn combatant_name(
    entity: Entity,
    raiders: &Query<&Raider, Without<Boss>>,
    bosses: &Query<&Boss>,
) -> String {
    if let Ok(raider) = raiders.get(entity) {
        raider.name.clone()
    } else if let Ok(boss) = bosses.get(entity) {
        boss.name.clone()
    } else {
        "Unknown".to_string()
    }
}

/// Record this frame's events in the combat log.
fn record_combat_log(
    mut combat_log: ResMut<CombatLog>,
    mut damage_events: EventReader<DamageEvent>,
    mut ability_events: EventReader<AbilityUsedEvent>,
    mut yell_events: EventReader<BossYellEvent>,
    mut death_events: EventReader<CombatantDeathEvent>,
    raiders: Query<&Raider, Without<Boss>>,
    bosses: Query<&Boss>,
) {
    for event in damage_events.read() {
        let source = combatant_name(event.source, &raiders, &bosses);
        let target = combatant_name(event.target, &raiders, &bosses);
        let message = match &event.ability_name {
            Some(ability) => format!(
                "{}'s {} hits {} for {:.0} damage",
                source, ability, target, event.amount
            ),
            None => format!("{} hits {} for {:.0} damage", source, target, event.amount),
        };
        combat_log.log(CombatLogEventType::Damage, message);
    }

    for event in ability_events.read() {
        let caster = combatant_name(event.caster, &raiders, &bosses);
        let message = match event.target {
            Some(target) => format!(
                "{} uses {} on {}",
                caster,
                event.ability_name,
                combatant_name(target, &raiders, &bosses)
            ),
            None => format!("{} uses {}", caster, event.ability_name),
        };
        combat_log.log(CombatLogEventType::AbilityUsed, message);
    }

    for event in yell_events.read() {
        let speaker = combatant_name(event.speaker, &raiders, &bosses);
        let message = match event.kind {
            YellKind::Yell => format!("{} yells: {}", speaker, event.text),
            YellKind::Emote => format!("{} {}", speaker, event.text),
        };
        combat_log.log(CombatLogEventType::Yell, message);
    }

    for event in death_events.read() {
        let victim = combatant_name(event.victim, &raiders, &bosses);
        let killer = combatant_name(event.killer, &raiders, &bosses);
        combat_log.log(
            CombatLogEventType::Death,
            format!("{} has been slain by {}!", victim, killer),
        );
    }
}
