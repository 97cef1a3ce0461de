//! Encounter Constants
//!
//! Default timings and thresholds for boss scripts. Individual encounters
//! override these via `assets/config/encounters.ron`; the defaults here match
//! the flesh-golem encounter the simulator ships with.

use std::time::Duration;

// ============================================================================
// Boss script defaults
// ============================================================================

/// Period of the boss's special melee attack.
pub const SPECIAL_ATTACK_PERIOD: Duration = Duration::from_millis(2400);

/// Hard-enrage timer: the boss goes berserk this long after engaging.
pub const BERSERK_DELAY: Duration = Duration::from_secs(7 * 60);

/// Delay between going berserk and the first ranged bolt.
pub const BOLT_LEAD_IN: Duration = Duration::from_secs(3);

/// Period of the post-berserk ranged bolt.
pub const BOLT_PERIOD: Duration = Duration::from_secs(3);

/// Cast time of the ranged bolt. While casting, event dispatch is blocked.
pub const BOLT_CAST_TIME: Duration = Duration::from_millis(1500);

/// Period of the low-health poll.
pub const HEALTH_CHECK_PERIOD: Duration = Duration::from_secs(1);

/// Health fraction at or below which the terminal enrage fires (inclusive).
pub const ENRAGE_HEALTH_FRACTION: f32 = 0.05;

/// Chance the boss taunts after killing a player.
pub const SLAY_TAUNT_CHANCE: f32 = 0.25;

// ============================================================================
// Simulation
// ============================================================================

/// Melee attack range in units. Matches the range used to flag threat
/// snapshot entries as melee-range.
pub const MELEE_RANGE: f32 = 2.5;

/// Extra outgoing melee damage while berserk (multiplier).
pub const BERSERK_DAMAGE_MULTIPLIER: f32 = 1.5;

/// Extra outgoing melee damage while frenzied (multiplier, stacks with
/// berserk multiplicatively).
pub const FRENZY_DAMAGE_MULTIPLIER: f32 = 1.25;

/// Threat multiplier for tanks, keeping them at the top of the table.
pub const TANK_THREAT_MULTIPLIER: f32 = 5.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods_are_positive() {
        assert!(SPECIAL_ATTACK_PERIOD > Duration::ZERO);
        assert!(BOLT_PERIOD > Duration::ZERO);
        assert!(HEALTH_CHECK_PERIOD > Duration::ZERO);
    }

    #[test]
    fn test_berserk_is_a_seven_minute_timer() {
        assert_eq!(BERSERK_DELAY, Duration::from_millis(420_000));
    }

    #[test]
    fn test_enrage_threshold_is_a_valid_fraction() {
        assert!(ENRAGE_HEALTH_FRACTION > 0.0 && ENRAGE_HEALTH_FRACTION < 1.0);
    }

    #[test]
    fn test_slay_taunt_chance_is_a_valid_probability() {
        assert!((0.0..=1.0).contains(&SLAY_TAUNT_CHANCE));
    }
}
