// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dwell-time leveling: requirement arithmetic, accumulation, the
//! advancement ratchet and the reset-all operation.

use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{AchievementRecord, TrackedLocation, UserLocationLevel};
use crate::time_utils::format_utc_rfc3339;
use std::sync::Arc;

/// Each level costs 50% more dwell time than the previous one.
const LEVEL_GROWTH_FACTOR: f64 = 1.5;

/// Float slack applied to the completion comparison, in hours (~0.36 s).
/// A 601 s checkpoint completes a 0.167 h target; 600.12 s does not.
const COMPLETION_EPSILON_HOURS: f64 = 1e-4;

/// Levels divisible by this are flagged as milestones.
const MILESTONE_INTERVAL: u32 = 5;

/// Required dwell hours to complete `level` at a location.
///
/// Level 1 is the base target unchanged; the requirement grows
/// geometrically from there, so the progression has a long tail.
pub fn required_hours(target_hours: f64, level: u32) -> f64 {
    target_hours * LEVEL_GROWTH_FACTOR.powi(level.saturating_sub(1) as i32)
}

fn is_completed(total_seconds: i64, target_hours: f64, level: u32) -> bool {
    total_seconds as f64 / 3600.0 + COMPLETION_EPSILON_HOURS >= required_hours(target_hours, level)
}

/// Result of crediting dwell time to a level row.
#[derive(Debug, Clone)]
pub struct LevelUpdate {
    pub row: UserLocationLevel,
    /// Whether the current level's requirement is satisfied
    pub is_completed: bool,
    /// Whether this update is the one that crossed the threshold
    pub newly_completed: bool,
}

/// Leveling operations against the record store.
#[derive(Clone)]
pub struct LevelingService {
    store: Arc<dyn RecordStore>,
}

impl LevelingService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Credit uncredited dwell seconds to the (user, location) level row,
    /// creating it lazily.
    ///
    /// Accumulation is additive across sessions: the caller passes the
    /// delta since the last checkpoint of the same session, so leaving
    /// and returning never loses previously earned time.
    pub async fn update_time(
        &self,
        user_id: &str,
        location: &TrackedLocation,
        delta_seconds: i64,
    ) -> Result<LevelUpdate> {
        let mut row = self
            .store
            .get_level(user_id, &location.id)
            .await?
            .unwrap_or_else(|| UserLocationLevel::new(user_id, &location.id, &location.name));

        let was_completed = is_completed(
            row.total_time_spent_seconds,
            location.target_hours,
            row.current_level,
        );

        row.total_time_spent_seconds += delta_seconds.max(0);
        self.store.upsert_level(&row).await?;

        let completed = is_completed(
            row.total_time_spent_seconds,
            location.target_hours,
            row.current_level,
        );
        let newly_completed = completed && !was_completed;

        if newly_completed {
            tracing::info!(
                user_id,
                location = %location.name,
                level = row.current_level,
                total_seconds = row.total_time_spent_seconds,
                "Level requirement satisfied"
            );
        }

        Ok(LevelUpdate {
            row,
            is_completed: completed,
            newly_completed,
        })
    }

    /// Advance the user one level at a location.
    ///
    /// One-way ratchet: fails with `Precondition` unless the current
    /// level's requirement is met; on success the level increments by
    /// exactly 1 and the accumulated time keeps accruing toward the next,
    /// larger requirement. The award record is appended here, which is
    /// what makes each award happen at most once.
    pub async fn advance(
        &self,
        user_id: &str,
        location: &TrackedLocation,
    ) -> Result<UserLocationLevel> {
        let mut row = self
            .store
            .get_level(user_id, &location.id)
            .await?
            .ok_or_else(|| {
                AppError::Precondition(format!(
                    "No dwell time recorded for user {} at {}",
                    user_id, location.id
                ))
            })?;

        let completed_level = row.current_level;
        let required = required_hours(location.target_hours, completed_level);
        if !is_completed(row.total_time_spent_seconds, location.target_hours, completed_level) {
            return Err(AppError::Precondition(format!(
                "Level {} at {} needs {:.4} h, only {:.4} h accumulated",
                completed_level,
                location.id,
                required,
                row.total_hours()
            )));
        }

        row.current_level += 1;
        self.store.upsert_level(&row).await?;

        let record = AchievementRecord {
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            level: completed_level,
            target_hours: required,
            achieved_hours: row.total_hours(),
            achievement_date: format_utc_rfc3339(chrono::Utc::now()),
            is_milestone: completed_level % MILESTONE_INTERVAL == 0,
        };
        // The level ratchet above is the source of truth; losing the
        // history row is logged but never blocks the advancement.
        if let Err(e) = self.store.append_achievement(user_id, &record).await {
            tracing::warn!(
                user_id,
                location = %location.id,
                level = completed_level,
                error = %e,
                "Failed to persist achievement record"
            );
        }

        tracing::info!(
            user_id,
            location = %location.name,
            level = row.current_level,
            "Level advanced"
        );
        Ok(row)
    }

    /// Reset every level row of a user back to level 1 with zero time.
    /// Unconditional and irreversible; returns the number of rows reset.
    pub async fn reset_all(&self, user_id: &str) -> Result<usize> {
        let reset_count = self.store.reset_levels(user_id).await?;
        tracing::info!(user_id, reset_count, "All location levels reset");
        Ok(reset_count)
    }
}
