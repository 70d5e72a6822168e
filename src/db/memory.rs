// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory record store.
//!
//! Production-shaped reference implementation of [`RecordStore`] used by
//! the replay binary and the test suites. Active-session uniqueness is
//! enforced through the dashmap entry API, which serializes contending
//! creators on the (user, location) key the same way a unique constraint
//! would.

use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{AchievementRecord, CheckpointRecord, Session, UserLocationLevel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Composite key for per-(user, location) records.
fn pair_key(user_id: &str, location_id: &str) -> String {
    format!(
        "{}_{}",
        urlencoding::encode(user_id),
        urlencoding::encode(location_id)
    )
}

/// In-memory implementation of the record store.
#[derive(Default)]
pub struct MemoryStore {
    /// Sessions by session id
    sessions: DashMap<String, Session>,
    /// (user, location) -> active session id
    active_index: DashMap<String, String>,
    /// (user, location) -> level row
    levels: DashMap<String, UserLocationLevel>,
    /// user -> achievement records, append-only
    achievements: DashMap<String, Vec<AchievementRecord>>,
    /// session id -> checkpoint audit rows, append-only
    checkpoints: DashMap<String, Vec<CheckpointRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoint audit rows for one session (tests, diagnostics).
    pub fn checkpoints_for_session(&self, session_id: &str) -> Vec<CheckpointRecord> {
        self.checkpoints
            .get(session_id)
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    // ─── Session Operations ──────────────────────────────────────

    async fn create_session_if_absent(&self, session: &Session) -> Result<Session> {
        let key = pair_key(&session.user_id, &session.location_id);
        match self.active_index.entry(key) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Active session already exists for user {} at {}",
                session.user_id, session.location_id
            ))),
            Entry::Vacant(vacant) => {
                self.sessions
                    .insert(session.id.clone(), session.clone());
                vacant.insert(session.id.clone());
                Ok(session.clone())
            }
        }
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(session_id).map(|s| s.clone()))
    }

    async fn find_active_session(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<Session>> {
        let session_id = match self.active_index.get(&pair_key(user_id, location_id)) {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        Ok(self.sessions.get(&session_id).map(|s| s.clone()))
    }

    async fn active_sessions_for_user(&self, user_id: &str) -> Result<Vec<Session>> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.is_active && s.user_id == user_id)
            .map(|s| s.clone())
            .collect())
    }

    async fn update_session_checkpoint(
        &self,
        session_id: &str,
        checkpointed_seconds: i64,
    ) -> Result<()> {
        let mut session = self.sessions.get_mut(session_id).ok_or_else(|| {
            AppError::NotFound(format!("Session {} not found", session_id))
        })?;
        session.checkpointed_seconds = checkpointed_seconds;
        Ok(())
    }

    async fn end_session(&self, session_id: &str, end_time: DateTime<Utc>) -> Result<()> {
        // Scope the session guard so it is released before the index is
        // touched; holding both invites lock-order inversion against
        // create_session_if_absent.
        let index_key = {
            let mut session = match self.sessions.get_mut(session_id) {
                Some(s) => s,
                None => return Ok(()),
            };
            if !session.is_active {
                return Ok(());
            }
            session.is_active = false;
            session.end_time = Some(end_time);
            pair_key(&session.user_id, &session.location_id)
        };

        // Only clear the index slot if it still points at this session.
        self.active_index
            .remove_if(&index_key, |_, active_id| active_id == session_id);
        Ok(())
    }

    // ─── Level Operations ────────────────────────────────────────

    async fn get_level(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<UserLocationLevel>> {
        Ok(self
            .levels
            .get(&pair_key(user_id, location_id))
            .map(|l| l.clone()))
    }

    async fn upsert_level(&self, level: &UserLocationLevel) -> Result<()> {
        self.levels.insert(
            pair_key(&level.user_id, &level.location_id),
            level.clone(),
        );
        Ok(())
    }

    async fn levels_for_user(&self, user_id: &str) -> Result<Vec<UserLocationLevel>> {
        Ok(self
            .levels
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.clone())
            .collect())
    }

    async fn reset_levels(&self, user_id: &str) -> Result<usize> {
        let mut reset_count = 0;
        for mut entry in self.levels.iter_mut() {
            if entry.user_id == user_id {
                entry.current_level = 1;
                entry.total_time_spent_seconds = 0;
                reset_count += 1;
            }
        }
        Ok(reset_count)
    }

    // ─── Achievement & Audit Operations ──────────────────────────

    async fn append_achievement(&self, user_id: &str, record: &AchievementRecord) -> Result<()> {
        self.achievements
            .entry(user_id.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn achievements_for_user(&self, user_id: &str) -> Result<Vec<AchievementRecord>> {
        Ok(self
            .achievements
            .get(user_id)
            .map(|records| records.clone())
            .unwrap_or_default())
    }

    async fn log_checkpoint(&self, record: &CheckpointRecord) -> Result<()> {
        self.checkpoints
            .entry(record.session_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }
}
