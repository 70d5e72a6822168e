// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dwell session records.

use crate::models::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dwell session at one tracked location.
///
/// At most one active session exists per (user_id, location_id); the
/// record store enforces this with an atomic insert-if-absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (UUID v4, also the document ID)
    pub id: String,
    pub user_id: String,
    pub location_id: String,
    pub location_name: String,
    /// The location's coordinate, snapshotted at session start
    pub coordinate: Coordinate,
    /// The location's base dwell requirement, snapshotted
    pub target_hours: f64,
    pub start_time: DateTime<Utc>,
    pub is_active: bool,
    pub end_time: Option<DateTime<Utc>>,
    /// High-water mark of elapsed seconds already credited to the level
    /// row by checkpoints of this session. Makes accumulation additive
    /// across sessions and safe to resume after a restart.
    #[serde(default)]
    pub checkpointed_seconds: i64,
}

/// Append-only checkpoint audit row (written only when auditing is on).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub session_id: String,
    pub user_id: String,
    pub location_id: String,
    pub coordinate: Coordinate,
    pub accuracy_meters: f64,
    pub elapsed_seconds: i64,
    pub recorded_at: DateTime<Utc>,
}
