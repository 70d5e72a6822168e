// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proximity state machine over the tracked-location catalog.

use crate::models::SmoothedPosition;
use crate::services::catalog::LocationCatalog;
use serde::Serialize;

/// Radius in meters defining "at a location".
pub const PROXIMITY_RADIUS_METERS: f64 = 50.0;

/// Per-user proximity state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProximityState {
    Away,
    Near { location_id: String },
}

impl ProximityState {
    /// The location the user is currently at, if any.
    pub fn location_id(&self) -> Option<&str> {
        match self {
            ProximityState::Away => None,
            ProximityState::Near { location_id } => Some(location_id),
        }
    }
}

/// A single state-machine edge produced by one position update.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Entered(String),
    Exited(String),
}

/// Result of evaluating one smoothed position against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityDecision {
    pub state: ProximityState,
    /// Edges in the order they must be applied. Moving directly from one
    /// location to another always yields an exit followed by an enter,
    /// never a rename.
    pub transitions: Vec<Transition>,
}

/// Evaluate a smoothed position against the catalog.
///
/// Pure function of (position, catalog, previous state). The match is the
/// strictly nearest location within [`PROXIMITY_RADIUS_METERS`]; exact
/// ties resolve to catalog order.
pub fn evaluate(
    position: &SmoothedPosition,
    catalog: &LocationCatalog,
    previous: &ProximityState,
) -> ProximityDecision {
    let nearest = catalog
        .nearest_within(&position.coordinate, PROXIMITY_RADIUS_METERS)
        .map(|(location, _)| location.id.clone());

    match (previous, nearest) {
        (ProximityState::Away, None) => ProximityDecision {
            state: ProximityState::Away,
            transitions: vec![],
        },
        (ProximityState::Away, Some(entered)) => ProximityDecision {
            state: ProximityState::Near {
                location_id: entered.clone(),
            },
            transitions: vec![Transition::Entered(entered)],
        },
        (ProximityState::Near { location_id }, None) => ProximityDecision {
            state: ProximityState::Away,
            transitions: vec![Transition::Exited(location_id.clone())],
        },
        (ProximityState::Near { location_id }, Some(found)) if *location_id == found => {
            ProximityDecision {
                state: ProximityState::Near {
                    location_id: found,
                },
                transitions: vec![],
            }
        }
        (ProximityState::Near { location_id }, Some(found)) => ProximityDecision {
            state: ProximityState::Near {
                location_id: found.clone(),
            },
            transitions: vec![
                Transition::Exited(location_id.clone()),
                Transition::Entered(found),
            ],
        },
    }
}
