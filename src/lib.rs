//! RaidSim - Raid Boss Encounter Simulator
//!
//! A headless simulator for scripted raid boss encounters: a timed-event
//! scheduler and boss combat controller driven through a small ECS layer,
//! with data-driven boss definitions and JSON-configured deterministic runs.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod encounter;
pub mod sim;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType, EncounterOutcome};
pub use encounter::controller::BossController;
pub use encounter::script::{BossScript, EncounterDefinitions};
pub use encounter::GameRng;
pub use sim::config::HeadlessEncounterConfig;
pub use sim::runner::run_headless_encounter;
