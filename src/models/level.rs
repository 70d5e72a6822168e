//! Per-location level progression and achievement records.

use serde::{Deserialize, Serialize};

/// Level progression state for one (user, location) pair.
///
/// Created lazily on first proximity. `current_level` only moves up, one
/// step per advancement; `total_time_spent_seconds` accumulates from
/// checkpoints and is only ever zeroed by an explicit reset-all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLocationLevel {
    pub user_id: String,
    pub location_id: String,
    pub location_name: String,
    /// Current level, >= 1
    pub current_level: u32,
    /// Cumulative dwell seconds across all sessions at this location
    pub total_time_spent_seconds: i64,
    pub is_unlocked: bool,
}

impl UserLocationLevel {
    /// Fresh level row for a (user, location) pair.
    pub fn new(user_id: &str, location_id: &str, location_name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            location_id: location_id.to_string(),
            location_name: location_name.to_string(),
            current_level: 1,
            total_time_spent_seconds: 0,
            is_unlocked: true,
        }
    }

    /// Accumulated dwell time in hours.
    pub fn total_hours(&self) -> f64 {
        self.total_time_spent_seconds as f64 / 3600.0
    }
}

/// Append-only record of an awarded level completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub location_id: String,
    pub location_name: String,
    /// The level that was completed
    pub level: u32,
    /// Dwell requirement of the completed level, in hours
    pub target_hours: f64,
    /// Dwell actually accumulated when the level was awarded, in hours
    pub achieved_hours: f64,
    /// RFC3339 timestamp of the award
    pub achievement_date: String,
    pub is_milestone: bool,
}

/// In-run celebration payload surfaced to the notification layer.
///
/// Deduplicated per tracking run; the level ratchet remains the
/// authoritative once-only guard for awards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementEvent {
    pub user_id: String,
    pub location_id: String,
    pub location_name: String,
    /// The level whose requirement was just satisfied
    pub level: u32,
    pub required_hours: f64,
    pub achieved_hours: f64,
}
