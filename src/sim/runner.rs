//! Headless encounter execution
//!
//! Runs raid encounters without any graphical output, suitable for automated
//! testing and balance analysis.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::time::Duration;

use crate::combat::log::{
    CombatLog, CombatLogEventType, EncounterMetadata, EncounterOutcome, RaiderMetadata,
};
use crate::combat::CombatPlugin;
use crate::encounter::controller::BossController;
use crate::encounter::instance::InstanceState;
use crate::encounter::script::EncounterConfigPlugin;
use crate::encounter::script::EncounterDefinitions;
use crate::encounter::GameRng;

use super::components::{Boss, BossAi, EncounterState, Raider};
use super::config::{EncounterSetup, HeadlessEncounterConfig};
use super::systems::{
    add_core_encounter_systems, configure_encounter_system_ordering, raider_spawns,
    EncounterSystemPhase,
};

/// Result of a completed headless encounter
///
/// This struct provides programmatic access to run results for testing and
/// analysis.
#[derive(Debug, Clone)]
pub struct EncounterResult {
    /// How the encounter ended
    pub outcome: EncounterOutcome,
    /// Total encounter duration in seconds (engage to end)
    pub encounter_time: f32,
    /// Raider statistics from the run
    pub raiders: Vec<RaiderResult>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Statistics for a single raider after the encounter
#[derive(Debug, Clone)]
pub struct RaiderResult {
    /// Raider name (e.g. "Tank 1")
    pub name: String,
    /// Role name (e.g. "Melee")
    pub role: String,
    /// Maximum health
    pub max_health: f32,
    /// Health remaining at encounter end (0 if dead)
    pub final_health: f32,
    /// Whether this raider survived
    pub survived: bool,
    /// Total damage dealt during the encounter
    pub damage_dealt: f32,
    /// Total damage taken during the encounter
    pub damage_taken: f32,
}

impl RaiderResult {
    fn from_raider(raider: &Raider) -> Self {
        Self {
            name: raider.name.clone(),
            role: raider.role.name().to_string(),
            max_health: raider.max_health,
            final_health: raider.current_health,
            survived: raider.is_alive(),
            damage_dealt: raider.damage_dealt,
            damage_taken: raider.damage_taken,
        }
    }

    fn to_metadata(&self) -> RaiderMetadata {
        RaiderMetadata {
            name: self.name.clone(),
            role: self.role.clone(),
            max_health: self.max_health,
            final_health: self.final_health,
            damage_dealt: self.damage_dealt,
            damage_taken: self.damage_taken,
            survived: self.survived,
        }
    }
}

/// Resource to track headless encounter state
#[derive(Resource)]
pub struct HeadlessEncounterState {
    /// Maximum encounter duration before declaring a timeout
    pub max_duration: f32,
    /// Custom output path for the encounter log
    pub output_path: Option<String>,
    /// Whether the encounter has completed
    pub encounter_complete: bool,
    /// Random seed for deterministic simulation (if provided)
    pub random_seed: Option<u64>,
    /// Encounter result (populated when the run completes)
    pub result: Option<EncounterResult>,
}

/// Plugin for headless encounter execution
pub struct HeadlessPlugin {
    pub config: HeadlessEncounterConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let definitions = app.world().resource::<EncounterDefinitions>();
        let setup = self
            .config
            .to_encounter_setup(definitions)
            .expect("Invalid encounter configuration");

        app.insert_resource(setup)
            .insert_resource(HeadlessEncounterState {
                max_duration: self.config.max_duration_secs,
                output_path: self.config.output_path.clone(),
                encounter_complete: false,
                random_seed: self.config.random_seed,
                result: None,
            })
            .init_resource::<EncounterState>()
            .init_resource::<InstanceState>();

        configure_encounter_system_ordering(app);
        add_core_encounter_systems(app);

        app.add_systems(Startup, headless_setup_encounter)
            .add_systems(
                Update,
                headless_check_encounter_end.after(EncounterSystemPhase::Logging),
            )
            .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

/// Setup system for a headless encounter: spawn the boss and the raid.
fn headless_setup_encounter(
    mut commands: Commands,
    setup: Res<EncounterSetup>,
    headless_state: Res<HeadlessEncounterState>,
    mut combat_log: ResMut<CombatLog>,
) {
    combat_log.clear();
    combat_log.log(
        CombatLogEventType::EncounterEvent,
        format!("Encounter started (headless mode): {}", setup.script.name),
    );

    // Initialize GameRng with seed if provided (deterministic mode)
    let game_rng = match headless_state.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            GameRng::from_seed(seed)
        }
        None => {
            info!("Using non-deterministic RNG (no seed provided)");
            GameRng::from_entropy()
        }
    };
    commands.insert_resource(game_rng);

    commands.spawn((
        Transform::from_xyz(0.0, 0.0, 0.0),
        Boss::new(&setup.script),
        BossAi {
            controller: BossController::new(setup.script.clone()),
        },
    ));

    for (transform, raider) in raider_spawns(&setup) {
        commands.spawn((transform, raider));
    }

    info!(
        "Headless encounter setup complete: {} tank(s) / {} melee / {} ranged vs {}",
        setup.tanks, setup.melee, setup.ranged, setup.script.name
    );
}

/// Check whether the run has ended (kill, wipe, or timeout) and finalize it.
fn headless_check_encounter_end(
    raiders: Query<&Raider, Without<Boss>>,
    boss_query: Query<&Boss>,
    mut state: ResMut<EncounterState>,
    mut combat_log: ResMut<CombatLog>,
    mut headless_state: ResMut<HeadlessEncounterState>,
) {
    if headless_state.encounter_complete || !state.engaged {
        return;
    }

    // Kill and wipe outcomes are settled by the death-resolution phase; the
    // runner only adds the timeout.
    if state.outcome.is_none() && state.elapsed >= headless_state.max_duration {
        info!("Encounter timed out after {:.1}s", state.elapsed);
        state.outcome = Some(EncounterOutcome::Timeout);
        combat_log.log(
            CombatLogEventType::EncounterEvent,
            format!("Encounter timed out after {:.1}s", state.elapsed),
        );
    }
    let Some(outcome) = state.outcome else {
        return;
    };

    let raider_results: Vec<RaiderResult> =
        raiders.iter().map(RaiderResult::from_raider).collect();
    let boss_name = boss_query
        .get_single()
        .map(|boss| boss.name.clone())
        .unwrap_or_default();

    let result = EncounterResult {
        outcome,
        encounter_time: state.elapsed,
        raiders: raider_results,
        random_seed: headless_state.random_seed,
    };

    let metadata = EncounterMetadata {
        boss_name,
        outcome,
        duration: state.elapsed,
        raiders: result.raiders.iter().map(|r| r.to_metadata()).collect(),
        random_seed: headless_state.random_seed,
    };
    match combat_log.save_to_file(&metadata, headless_state.output_path.as_deref()) {
        Ok(filename) => {
            println!("Encounter complete. Log saved to: {}", filename);
        }
        Err(e) => {
            eprintln!("Failed to save combat log: {}", e);
        }
    }

    headless_state.result = Some(result);
    headless_state.encounter_complete = true;
}

/// Exit the app when the encounter is complete
fn headless_exit_on_complete(
    headless_state: Res<HeadlessEncounterState>,
    mut exit: EventWriter<AppExit>,
) {
    if headless_state.encounter_complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless encounter with the given configuration
pub fn run_headless_encounter(config: HeadlessEncounterConfig) -> Result<(), String> {
    config.validate()?;

    println!("Starting headless encounter simulation...");
    println!("  Encounter: {}", config.encounter);
    println!(
        "  Raid: {} tank(s), {} melee, {} ranged",
        config.tanks, config.melee, config.ranged
    );
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    App::new()
        // Minimal plugins - no window, no rendering
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        // Transform plugin needed for entity positions
        .add_plugins(TransformPlugin)
        // Load boss definitions from config
        .add_plugins(EncounterConfigPlugin)
        // Combat events and log
        .add_plugins(CombatPlugin)
        // Our headless encounter plugin
        .add_plugins(HeadlessPlugin { config })
        .run();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::components::RaiderRole;

    #[test]
    fn test_raider_result_captures_final_state() {
        let mut raider = Raider::new(RaiderRole::Melee, 3);
        raider.current_health = 0.0;
        raider.damage_dealt = 50_000.0;
        raider.damage_taken = raider.max_health;

        let result = RaiderResult::from_raider(&raider);
        assert_eq!(result.name, "Melee 3");
        assert_eq!(result.role, "Melee");
        assert!(!result.survived);
        assert_eq!(result.final_health, 0.0);
        assert_eq!(result.damage_dealt, 50_000.0);

        let metadata = result.to_metadata();
        assert_eq!(metadata.name, result.name);
        assert!(!metadata.survived);
    }
}
