// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod achievements;
pub mod catalog;
pub mod leveling;
pub mod proximity;
pub mod session;
pub mod smoothing;

pub use achievements::{achievement_key, ShownAchievements};
pub use catalog::{CatalogError, LocationCatalog};
pub use leveling::{required_hours, LevelUpdate, LevelingService};
pub use proximity::{ProximityState, Transition, PROXIMITY_RADIUS_METERS};
pub use session::{CheckpointOutcome, SessionService};
pub use smoothing::{PositionSmoother, SMOOTHING_WINDOW};
