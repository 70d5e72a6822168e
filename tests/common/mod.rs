// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, TimeZone, Utc};
use dwell_tracker::config::Config;
use dwell_tracker::db::MemoryStore;
use dwell_tracker::models::{Coordinate, PositionFix, TrackedLocation};
use dwell_tracker::services::LocationCatalog;
use dwell_tracker::TrackingEngine;
use std::sync::Arc;

/// Dolores Park (10-minute base target).
pub const PARK: (f64, f64) = (37.7596, -122.4270);
/// Ritual Coffee, ~1.1 km north of the park.
pub const CAFE: (f64, f64) = (37.7696, -122.4270);

/// Build a tracked location at a (lat, lon) pair.
#[allow(dead_code)]
pub fn location(id: &str, name: &str, at: (f64, f64), target_hours: f64) -> TrackedLocation {
    TrackedLocation {
        id: id.to_string(),
        name: name.to_string(),
        coordinate: Coordinate {
            latitude: at.0,
            longitude: at.1,
        },
        target_hours,
    }
}

/// Two-location catalog shared by most engine tests.
#[allow(dead_code)]
pub fn test_catalog() -> LocationCatalog {
    LocationCatalog::from_locations(vec![
        location("park", "Dolores Park", PARK, 0.167),
        location("cafe", "Ritual Coffee", CAFE, 0.5),
    ])
}

/// Engine over a fresh in-memory store.
#[allow(dead_code)]
pub fn test_engine() -> (TrackingEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = TrackingEngine::new(store.clone(), test_catalog(), &Config::test_default());
    (engine, store)
}

/// Engine sharing an existing store (restart/recovery scenarios).
#[allow(dead_code)]
pub fn test_engine_with_store(store: Arc<MemoryStore>) -> TrackingEngine {
    TrackingEngine::new(store, test_catalog(), &Config::test_default())
}

/// Deterministic base timestamp for dwell arithmetic.
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

/// A fix at (lat, lon) with 10 m accuracy.
#[allow(dead_code)]
pub fn fix_at(at: (f64, f64), timestamp: DateTime<Utc>) -> PositionFix {
    PositionFix {
        coordinate: Coordinate {
            latitude: at.0,
            longitude: at.1,
        },
        accuracy_meters: 10.0,
        timestamp,
        altitude_meters: None,
        heading_degrees: None,
        speed_mps: None,
    }
}
