//! Encounter Simulation
//!
//! The ECS layer that drives a boss encounter end to end: spawning the boss
//! and raid, running the per-frame combat pipeline, and executing complete
//! headless runs from JSON configuration.

pub mod components;
pub mod config;
pub mod runner;
pub mod systems;
