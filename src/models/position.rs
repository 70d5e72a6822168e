// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw and smoothed position types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A geographic coordinate. Immutable value type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinate {
    /// Degrees, [-90, 90]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    /// Degrees, [-180, 180]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// A raw fix from the external location provider.
///
/// Fixes arrive one at a time. Out-of-order timestamps are tolerated;
/// dwell arithmetic clamps negative elapsed time to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PositionFix {
    #[validate(nested)]
    pub coordinate: Coordinate,
    /// Reported accuracy radius in meters
    #[validate(range(min = 0.0))]
    pub accuracy_meters: f64,
    /// Provider timestamp for the fix
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_degrees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
}

/// A stabilized position derived from the smoothing window.
///
/// Never persisted; recomputed on every accepted fix. `smoothed` is set
/// only when at least two samples were averaged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmoothedPosition {
    pub coordinate: Coordinate,
    pub accuracy_meters: f64,
    pub timestamp: DateTime<Utc>,
    pub smoothed: bool,
}

impl SmoothedPosition {
    /// Pass a raw fix through unchanged (window too small to average).
    pub fn from_raw(fix: &PositionFix) -> Self {
        Self {
            coordinate: fix.coordinate,
            accuracy_meters: fix.accuracy_meters,
            timestamp: fix.timestamp,
            smoothed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(latitude: f64, longitude: f64, accuracy_meters: f64) -> PositionFix {
        PositionFix {
            coordinate: Coordinate {
                latitude,
                longitude,
            },
            accuracy_meters,
            timestamp: Utc::now(),
            altitude_meters: None,
            heading_degrees: None,
            speed_mps: None,
        }
    }

    #[test]
    fn test_valid_fix_passes_validation() {
        assert!(fix(37.0, -122.0, 10.0).validate().is_ok());
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        assert!(fix(91.0, 0.0, 10.0).validate().is_err());
        assert!(fix(-90.5, 0.0, 10.0).validate().is_err());
    }

    #[test]
    fn test_out_of_range_longitude_rejected() {
        assert!(fix(0.0, 180.5, 10.0).validate().is_err());
    }

    #[test]
    fn test_negative_accuracy_rejected() {
        assert!(fix(0.0, 0.0, -1.0).validate().is_err());
    }

    #[test]
    fn test_nan_coordinate_rejected() {
        assert!(fix(f64::NAN, 0.0, 10.0).validate().is_err());
    }
}
