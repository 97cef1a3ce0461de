//! RaidSim - Raid Boss Encounter Simulator
//!
//! Runs scripted raid boss encounters headlessly from a JSON configuration
//! and writes a combat log with the outcome.

use raidsim::cli;
use raidsim::{run_headless_encounter, HeadlessEncounterConfig};

fn main() {
    let args = cli::parse_args();

    let Some(config_path) = args.headless else {
        eprintln!("No encounter config given. Run with --headless <CONFIG_FILE>.");
        std::process::exit(2);
    };

    let mut config = match HeadlessEncounterConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // CLI flags override the config file.
    if let Some(output) = args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }

    if let Err(e) = run_headless_encounter(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
