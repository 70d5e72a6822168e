// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracking engine: per-user position pipelines.
//!
//! Owns the per-run state (smoothing window, proximity state,
//! shown-achievement set) for every user with an active tracking run and
//! drives the whole update path for each accepted fix:
//! smooth -> proximity -> session -> leveling -> achievement dedup.

use crate::config::Config;
use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{
    AchievementEvent, PositionFix, Session, SmoothedPosition, TrackedLocation, UserLocationLevel,
};
use crate::services::achievements::{achievement_key, ShownAchievements};
use crate::services::catalog::LocationCatalog;
use crate::services::leveling::{required_hours, LevelingService};
use crate::services::proximity::{self, ProximityState, Transition};
use crate::services::session::SessionService;
use crate::services::smoothing::PositionSmoother;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::Validate;

/// Everything a caller learns from one accepted position fix.
#[derive(Debug, Clone, Serialize)]
pub struct PositionUpdate {
    pub smoothed_position: SmoothedPosition,
    pub proximity_state: ProximityState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_session: Option<Session>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_state: Option<UserLocationLevel>,
    /// Set only when a level completion should be surfaced to the user
    /// (first time this run for that completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<AchievementEvent>,
}

/// Per-run state owned exclusively by one user's pipeline.
struct UserPipeline {
    smoother: PositionSmoother,
    proximity: ProximityState,
    shown: ShownAchievements,
    /// Set on stop; fixes racing the stop are rejected once it is.
    stopped: bool,
}

/// The location presence and leveling engine.
///
/// Fixes for the same user are processed one at a time in arrival order
/// (the per-user mutex is held across the whole update); different users
/// only share the record store.
pub struct TrackingEngine {
    store: Arc<dyn RecordStore>,
    catalog: LocationCatalog,
    sessions: SessionService,
    leveling: LevelingService,
    pipelines: DashMap<String, Arc<Mutex<UserPipeline>>>,
    end_concurrency: usize,
}

impl TrackingEngine {
    pub fn new(store: Arc<dyn RecordStore>, catalog: LocationCatalog, config: &Config) -> Self {
        Self {
            sessions: SessionService::new(store.clone(), config.audit_checkpoints),
            leveling: LevelingService::new(store.clone()),
            store,
            catalog,
            pipelines: DashMap::new(),
            end_concurrency: config.end_concurrency,
        }
    }

    /// Whether a tracking run is active for the user.
    pub fn is_tracking(&self, user_id: &str) -> bool {
        self.pipelines.contains_key(user_id)
    }

    /// Begin a tracking run for a user, recovering any session that was
    /// still active (e.g. after a reload or disconnect).
    ///
    /// A recovered session primes the proximity state, so elapsed time
    /// keeps accruing from the original start instead of resetting.
    pub async fn start_tracking(&self, user_id: &str) -> Result<Option<Session>> {
        if self.is_tracking(user_id) {
            return self.sessions.recover(user_id).await;
        }

        let recovered = self.sessions.recover(user_id).await?;
        let proximity = match &recovered {
            Some(session) => {
                tracing::info!(
                    user_id,
                    session_id = %session.id,
                    location = %session.location_name,
                    "Recovered active session"
                );
                ProximityState::Near {
                    location_id: session.location_id.clone(),
                }
            }
            None => ProximityState::Away,
        };

        self.pipelines
            .entry(user_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(UserPipeline {
                    smoother: PositionSmoother::new(),
                    proximity,
                    shown: ShownAchievements::new(),
                    stopped: false,
                }))
            });
        tracing::info!(user_id, "Tracking run started");
        Ok(recovered)
    }

    /// Process one raw position fix for a user.
    ///
    /// This is the single entry point driving smoothing, proximity,
    /// sessions and leveling. A malformed fix is rejected with
    /// `Validation` and leaves all prior state untouched. Store failures
    /// surface as errors; the next fix retries from the durable values.
    pub async fn ingest_position(
        &self,
        user_id: &str,
        fix: PositionFix,
    ) -> Result<PositionUpdate> {
        fix.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let pipeline = self
            .pipelines
            .get(user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                AppError::NotFound(format!("No active tracking run for user {}", user_id))
            })?;
        let mut run = pipeline.lock().await;
        if run.stopped {
            return Err(AppError::NotFound(format!(
                "Tracking run for user {} was stopped",
                user_id
            )));
        }

        let smoothed = run.smoother.push(&fix);
        let decision = proximity::evaluate(&smoothed, &self.catalog, &run.proximity);

        for transition in &decision.transitions {
            match transition {
                Transition::Exited(location_id) => {
                    self.close_session_for(user_id, location_id, fix.timestamp)
                        .await?;
                }
                Transition::Entered(location_id) => {
                    tracing::info!(user_id, location = %location_id, "Entered location");
                }
            }
        }

        let mut active_session = None;
        let mut level_state = None;
        let mut achievement = None;

        if let Some(location_id) = decision.state.location_id() {
            let location = self.catalog.get(location_id).ok_or_else(|| {
                AppError::NotFound(format!("Unknown location {}", location_id))
            })?;

            let session = self
                .resume_or_start(user_id, location, fix.timestamp)
                .await?;
            let outcome = self
                .sessions
                .checkpoint(
                    &session.id,
                    smoothed.coordinate,
                    smoothed.accuracy_meters,
                    fix.timestamp,
                )
                .await?;
            let update = self
                .leveling
                .update_time(user_id, location, outcome.delta_seconds)
                .await?;

            if update.newly_completed {
                let level = update.row.current_level;
                let key = achievement_key(&location.id, level, fix.timestamp);
                let event = AchievementEvent {
                    user_id: user_id.to_string(),
                    location_id: location.id.clone(),
                    location_name: location.name.clone(),
                    level,
                    required_hours: required_hours(location.target_hours, level),
                    achieved_hours: update.row.total_hours(),
                };
                achievement = run.shown.notify_if_new(&key, event);
            }

            level_state = Some(update.row);
            active_session = self.store.get_session(&session.id).await?;
        }

        run.proximity = decision.state.clone();

        Ok(PositionUpdate {
            smoothed_position: smoothed,
            proximity_state: decision.state,
            active_session,
            level_state,
            achievement,
        })
    }

    /// Stop a user's tracking run.
    ///
    /// No fix is processed after this returns: the run is flagged stopped
    /// under its own lock before the pipeline is dropped. Any open
    /// session is ended best-effort; returns the session that was ended,
    /// if any. Stopping a user who is not tracking is a no-op.
    pub async fn stop_tracking(&self, user_id: &str) -> Result<Option<Session>> {
        let pipeline = match self.pipelines.get(user_id) {
            Some(entry) => entry.value().clone(),
            None => return Ok(None),
        };
        let mut run = pipeline.lock().await;
        if run.stopped {
            return Ok(None);
        }
        run.stopped = true;

        let mut ended = None;
        if let Some(location_id) = run.proximity.location_id().map(str::to_string) {
            match self.store.find_active_session(user_id, &location_id).await {
                Ok(Some(session)) => match self.sessions.end(&session.id, Utc::now()).await {
                    Ok(()) => {
                        tracing::info!(
                            user_id,
                            session_id = %session.id,
                            "Session ended on tracking stop"
                        );
                        ended = Some(session);
                    }
                    Err(e) => {
                        tracing::warn!(
                            user_id,
                            session_id = %session.id,
                            error = %e,
                            "Failed to end session on tracking stop"
                        );
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Failed to look up session on stop");
                }
            }
        }

        self.pipelines.remove(user_id);
        tracing::info!(user_id, "Tracking run stopped");
        Ok(ended)
    }

    /// Stop every tracking run, ending open sessions with bounded
    /// concurrency.
    pub async fn shutdown(&self) {
        let user_ids: Vec<String> = self.pipelines.iter().map(|e| e.key().clone()).collect();
        if user_ids.is_empty() {
            return;
        }
        tracing::info!(count = user_ids.len(), "Stopping all tracking runs");

        stream::iter(user_ids)
            .map(|user_id| async move {
                if let Err(e) = self.stop_tracking(&user_id).await {
                    tracing::warn!(user_id = %user_id, error = %e, "Failed to stop tracking run");
                }
            })
            .buffer_unordered(self.end_concurrency)
            .collect::<Vec<()>>()
            .await;
    }

    // ─── Pass-through Operations ─────────────────────────────────

    /// Advance the user one level at a location (fails with
    /// `Precondition` unless the current level is completed).
    pub async fn advance_level(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<UserLocationLevel> {
        let location = self.location(location_id)?;
        self.leveling.advance(user_id, location).await
    }

    /// Reset every level row of the user; returns the count reset.
    pub async fn reset_all_levels(&self, user_id: &str) -> Result<usize> {
        self.leveling.reset_all(user_id).await
    }

    /// Most recent active session for the user, if any.
    pub async fn get_active_session(&self, user_id: &str) -> Result<Option<Session>> {
        self.sessions.recover(user_id).await
    }

    /// Level row for a (user, location) pair, if it exists yet.
    pub async fn get_level(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<UserLocationLevel>> {
        self.store.get_level(user_id, location_id).await
    }

    /// All level rows for the user.
    pub async fn level_rows_for_user(&self, user_id: &str) -> Result<Vec<UserLocationLevel>> {
        self.store.levels_for_user(user_id).await
    }

    /// Awarded achievements for the user, oldest first.
    pub async fn achievements_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<crate::models::AchievementRecord>> {
        self.store.achievements_for_user(user_id).await
    }

    // ─── Helpers ─────────────────────────────────────────────────

    fn location(&self, location_id: &str) -> Result<&TrackedLocation> {
        self.catalog
            .get(location_id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown location {}", location_id)))
    }

    /// End the active session for (user, location) after an exit.
    async fn close_session_for(
        &self,
        user_id: &str,
        location_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(session) = self.store.find_active_session(user_id, location_id).await? {
            self.sessions.end(&session.id, now).await?;
            tracing::info!(
                user_id,
                location = %location_id,
                session_id = %session.id,
                "Left location, session ended"
            );
        }
        Ok(())
    }

    /// Resume the active session for the pair, or start a new one.
    ///
    /// A `Conflict` from start means another device won the race to
    /// create the session; that session is resumed instead.
    async fn resume_or_start(
        &self,
        user_id: &str,
        location: &TrackedLocation,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        if let Some(existing) = self.store.find_active_session(user_id, &location.id).await? {
            return Ok(existing);
        }
        match self.sessions.start(user_id, location, now).await {
            Ok(session) => Ok(session),
            Err(e) if e.is_conflict() => self
                .store
                .find_active_session(user_id, &location.id)
                .await?
                .ok_or(e),
            Err(e) => Err(e),
        }
    }
}
