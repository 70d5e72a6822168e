// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dwell session lifecycle: start, checkpoint, end, recover.

use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{CheckpointRecord, Coordinate, Session, TrackedLocation};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Result of a checkpoint against an active session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckpointOutcome {
    /// Seconds elapsed since the session started (clamped to >= 0)
    pub elapsed_seconds: i64,
    /// Seconds not yet credited to the level row by earlier checkpoints
    /// of this session
    pub delta_seconds: i64,
}

/// Session lifecycle operations against the record store.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn RecordStore>,
    audit_checkpoints: bool,
}

impl SessionService {
    pub fn new(store: Arc<dyn RecordStore>, audit_checkpoints: bool) -> Self {
        Self {
            store,
            audit_checkpoints,
        }
    }

    /// Start a new session for a user at a location.
    ///
    /// Fails with `Conflict` if an active session already exists for the
    /// pair; the caller treats that as a resume, not a failure.
    pub async fn start(
        &self,
        user_id: &str,
        location: &TrackedLocation,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            coordinate: location.coordinate,
            target_hours: location.target_hours,
            start_time: now,
            is_active: true,
            end_time: None,
            checkpointed_seconds: 0,
        };

        let stored = self.store.create_session_if_absent(&session).await?;
        tracing::info!(
            user_id,
            location = %location.name,
            session_id = %stored.id,
            "Session started"
        );
        Ok(stored)
    }

    /// Checkpoint an active session at `now`.
    ///
    /// Computes elapsed seconds since start and the uncredited delta
    /// since the previous checkpoint, then persists the new high-water
    /// mark. Fails with `NotFound` if the session is absent or inactive.
    pub async fn checkpoint(
        &self,
        session_id: &str,
        coordinate: Coordinate,
        accuracy_meters: f64,
        now: DateTime<Utc>,
    ) -> Result<CheckpointOutcome> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| {
                AppError::NotFound(format!("Active session {} not found", session_id))
            })?;

        let elapsed_seconds = (now - session.start_time).num_seconds().max(0);
        let delta_seconds = (elapsed_seconds - session.checkpointed_seconds).max(0);

        // The mark only moves forward; an out-of-order fix with a smaller
        // elapsed value must not regress it.
        let mark = elapsed_seconds.max(session.checkpointed_seconds);
        self.store
            .update_session_checkpoint(session_id, mark)
            .await?;

        if self.audit_checkpoints {
            let record = CheckpointRecord {
                session_id: session_id.to_string(),
                user_id: session.user_id.clone(),
                location_id: session.location_id.clone(),
                coordinate,
                accuracy_meters,
                elapsed_seconds,
                recorded_at: now,
            };
            if let Err(e) = self.store.log_checkpoint(&record).await {
                tracing::warn!(
                    session_id,
                    error = %e,
                    "Failed to write checkpoint audit record"
                );
            }
        }

        tracing::debug!(session_id, elapsed_seconds, delta_seconds, "Checkpoint");
        Ok(CheckpointOutcome {
            elapsed_seconds,
            delta_seconds,
        })
    }

    /// End a session. Idempotent: duplicate exit events and retries
    /// against an already-closed or unknown session succeed as a no-op.
    pub async fn end(&self, session_id: &str, now: DateTime<Utc>) -> Result<()> {
        self.store.end_session(session_id, now).await
    }

    /// Most recent active session for a user, if any.
    ///
    /// Multiple active rows for one user should not occur, but when they
    /// do the most recent start_time wins rather than crashing.
    pub async fn recover(&self, user_id: &str) -> Result<Option<Session>> {
        let mut active = self.store.active_sessions_for_user(user_id).await?;
        if active.len() > 1 {
            tracing::warn!(
                user_id,
                count = active.len(),
                "Multiple active sessions found, resuming the most recent"
            );
        }
        active.sort_by_key(|s| s.start_time);
        Ok(active.pop())
    }
}
