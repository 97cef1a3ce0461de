//! Command-line interface for RaidSim
//!
//! Headless raid encounter simulation driven by a JSON config file.

use clap::Parser;
use std::path::PathBuf;

/// Raid boss encounter simulator
#[derive(Parser, Debug)]
#[command(name = "raidsim")]
#[command(about = "Raid boss encounter simulator")]
#[command(version)]
pub struct Args {
    /// Run a headless encounter with the specified JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the encounter log (overrides the config file)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum encounter duration in seconds (overrides the config file)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for deterministic runs (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
