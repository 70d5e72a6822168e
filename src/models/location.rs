// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Tracked location model.

use crate::models::Coordinate;
use serde::{Deserialize, Serialize};

/// A named point of interest from the external catalog.
///
/// Read-only reference data; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedLocation {
    /// Unique catalog identifier
    pub id: String,
    /// Display name (e.g. "Dolores Park")
    pub name: String,
    /// Location of the point of interest
    pub coordinate: Coordinate,
    /// Base dwell requirement in hours for level 1 (must be > 0)
    pub target_hours: f64,
}
