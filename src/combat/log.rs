//! Combat logging
//!
//! Records all encounter events for display and post-run analysis, and saves
//! them as JSON together with encounter metadata when a run completes.

use bevy::prelude::*;
use serde::Serialize;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Timestamp in encounter time (seconds since engage)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Boss ability invoked
    AbilityUsed,
    /// Boss yell or emote
    Yell,
    /// Combatant died
    Death,
    /// Encounter event (engage, wipe, kill, timeout)
    EncounterEvent,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncounterOutcome {
    /// The boss died.
    Kill,
    /// Every raider died.
    Wipe,
    /// Neither side won before the duration cap.
    Timeout,
}

/// Final stats for one raider, captured when the run ends.
#[derive(Debug, Clone, Serialize)]
pub struct RaiderMetadata {
    pub name: String,
    pub role: String,
    pub max_health: f32,
    pub final_health: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub survived: bool,
}

/// Encounter-level metadata stored alongside the log entries.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterMetadata {
    pub boss_name: String,
    pub outcome: EncounterOutcome,
    /// Encounter duration in seconds (engage to end)
    pub duration: f32,
    pub raiders: Vec<RaiderMetadata>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Serialized shape of the saved log file.
#[derive(Serialize)]
struct SavedLog<'a> {
    metadata: &'a EncounterMetadata,
    entries: &'a [CombatLogEntry],
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current encounter time
    pub encounter_time: f32,
}

impl CombatLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.encounter_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.encounter_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Save the log plus metadata as pretty-printed JSON.
    ///
    /// Uses `output_path` when given, otherwise a timestamped file in the
    /// working directory. Returns the path written.
    pub fn save_to_file(
        &self,
        metadata: &EncounterMetadata,
        output_path: Option<&str>,
    ) -> Result<String, String> {
        let filename = match output_path {
            Some(path) => path.to_string(),
            None => {
                let unix_secs = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                format!("encounter_log_{}.json", unix_secs)
            }
        };

        let saved = SavedLog {
            metadata,
            entries: &self.entries,
        };
        let json = serde_json::to_string_pretty(&saved)
            .map_err(|e| format!("Failed to serialize combat log: {}", e))?;
        std::fs::write(&filename, json)
            .map_err(|e| format!("Failed to write {}: {}", filename, e))?;

        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_entries_carry_the_log_timestamp() {
        let mut log = CombatLog::default();
        log.encounter_time = 12.5;
        log.log(CombatLogEventType::Damage, "hit".to_string());
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].timestamp, 12.5);
    }

    #[test]
    fn test_filter_by_type() {
        let mut log = CombatLog::default();
        log.log(CombatLogEventType::Damage, "a".to_string());
        log.log(CombatLogEventType::Yell, "b".to_string());
        log.log(CombatLogEventType::Damage, "c".to_string());

        assert_eq!(log.filter_by_type(CombatLogEventType::Damage).len(), 2);
        assert_eq!(log.filter_by_type(CombatLogEventType::Yell).len(), 1);
        assert_eq!(log.filter_by_type(CombatLogEventType::Death).len(), 0);
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let mut log = CombatLog::default();
        for i in 0..5 {
            log.log(CombatLogEventType::Damage, format!("hit {}", i));
        }
        let recent: Vec<&str> = log.recent(2).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(recent, vec!["hit 3", "hit 4"]);
    }

    #[test]
    fn test_clear_resets_time_and_entries() {
        let mut log = CombatLog::default();
        log.encounter_time = 30.0;
        log.log(CombatLogEventType::Death, "gone".to_string());
        log.clear();
        assert!(log.entries.is_empty());
        assert_eq!(log.encounter_time, 0.0);
    }

    #[test]
    fn test_damage_line_format_is_parseable() {
        // The sim formats damage lines like this; downstream tooling greps
        // them, so lock the shape down.
        let line = format!(
            "{}'s {} hits {} for {:.0} damage",
            "Gurtogg", "Hateful Strike", "Raider 2", 22412.7
        );
        let re = Regex::new(r"^(.+)'s (.+) hits (.+) for (\d+) damage$").unwrap();
        let caps = re.captures(&line).expect("line matches");
        assert_eq!(&caps[1], "Gurtogg");
        assert_eq!(&caps[4], "22413");
    }
}
