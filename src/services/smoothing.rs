// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPS jitter smoothing over a bounded sliding window.

use crate::models::{Coordinate, PositionFix, SmoothedPosition};
use std::collections::VecDeque;

/// Number of recent fixes averaged per tracking run.
pub const SMOOTHING_WINDOW: usize = 5;

/// Fixed-capacity FIFO of recent fixes for one tracking run.
///
/// Output is the unweighted mean of latitude, longitude and accuracy over
/// the buffered fixes. Extreme single-fix noise is damped rather than
/// discarded; there is no outlier rejection or accuracy weighting.
#[derive(Debug, Default)]
pub struct PositionSmoother {
    window: VecDeque<PositionFix>,
}

impl PositionSmoother {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(SMOOTHING_WINDOW),
        }
    }

    /// Push a new fix and return the stabilized position.
    ///
    /// With fewer than two buffered samples the raw fix passes through
    /// unchanged. The returned position always carries the new fix's
    /// timestamp.
    pub fn push(&mut self, fix: &PositionFix) -> SmoothedPosition {
        if self.window.len() == SMOOTHING_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(fix.clone());

        if self.window.len() < 2 {
            return SmoothedPosition::from_raw(fix);
        }

        let n = self.window.len() as f64;
        let (lat_sum, lon_sum, acc_sum) = self.window.iter().fold(
            (0.0, 0.0, 0.0),
            |(lat, lon, acc), f| {
                (
                    lat + f.coordinate.latitude,
                    lon + f.coordinate.longitude,
                    acc + f.accuracy_meters,
                )
            },
        );

        SmoothedPosition {
            coordinate: Coordinate {
                latitude: lat_sum / n,
                longitude: lon_sum / n,
            },
            accuracy_meters: acc_sum / n,
            timestamp: fix.timestamp,
            smoothed: true,
        }
    }

    /// Number of fixes currently buffered.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

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
    fn test_single_fix_passes_through_raw() {
        let mut smoother = PositionSmoother::new();
        let f = fix(37.0, -122.0, 12.0);
        let out = smoother.push(&f);
        assert!(!out.smoothed);
        assert_eq!(out.coordinate, f.coordinate);
        assert_eq!(out.accuracy_meters, 12.0);
    }

    #[test]
    fn test_two_fixes_are_averaged() {
        let mut smoother = PositionSmoother::new();
        smoother.push(&fix(37.0, -122.0, 10.0));
        let out = smoother.push(&fix(37.002, -122.002, 20.0));
        assert!(out.smoothed);
        assert!((out.coordinate.latitude - 37.001).abs() < 1e-9);
        assert!((out.coordinate.longitude - -122.001).abs() < 1e-9);
        assert!((out.accuracy_meters - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_evicts_oldest_fix() {
        let mut smoother = PositionSmoother::new();
        // Fill the window with an outlier first
        smoother.push(&fix(40.0, -120.0, 100.0));
        for _ in 0..SMOOTHING_WINDOW {
            smoother.push(&fix(37.0, -122.0, 10.0));
        }
        assert_eq!(smoother.len(), SMOOTHING_WINDOW);

        // The outlier has been evicted, so the mean is exact
        let out = smoother.push(&fix(37.0, -122.0, 10.0));
        assert_eq!(out.coordinate.latitude, 37.0);
        assert_eq!(out.coordinate.longitude, -122.0);
        assert_eq!(out.accuracy_meters, 10.0);
    }

    #[test]
    fn test_full_window_of_identical_fixes_is_idempotent() {
        let mut smoother = PositionSmoother::new();
        let f = fix(37.3318, -122.0312, 8.0);
        let mut out = smoother.push(&f);
        for _ in 0..(SMOOTHING_WINDOW * 2) {
            out = smoother.push(&f);
        }
        assert!(out.smoothed);
        assert_eq!(out.coordinate, f.coordinate);
        assert_eq!(out.accuracy_meters, f.accuracy_meters);
    }

    #[test]
    fn test_outlier_is_damped_not_discarded() {
        let mut smoother = PositionSmoother::new();
        for _ in 0..SMOOTHING_WINDOW {
            smoother.push(&fix(37.0, -122.0, 10.0));
        }
        // One wild fix moves the mean by 1/N of its offset
        let out = smoother.push(&fix(37.005, -122.0, 10.0));
        assert!((out.coordinate.latitude - 37.001).abs() < 1e-9);
    }
}
