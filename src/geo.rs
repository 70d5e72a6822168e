// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distance between coordinates.

use crate::models::Coordinate;

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
///
/// Symmetric, zero for identical points. The intermediate square root
/// argument is clamped to [0, 1] so antipodal and near-pole inputs stay
/// numerically stable.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_identical_points_are_zero() {
        let a = coord(37.3318, -122.0312);
        assert_eq!(distance_meters(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = coord(37.3318, -122.0312);
        let b = coord(37.4419, -122.1430);
        assert_eq!(distance_meters(&a, &b), distance_meters(&b, &a));
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 1.0);
        // pi * R / 180 with R = 6_371_000
        let expected = 111_194.93;
        let d = distance_meters(&a, &b);
        assert!(
            (d - expected).abs() < 1.0,
            "Expected ~{} m, got {} m",
            expected,
            d
        );
    }

    #[test]
    fn test_short_distance_accuracy() {
        // ~50 m north of the reference point
        let a = coord(37.0, -122.0);
        let b = coord(37.00045, -122.0);
        let d = distance_meters(&a, &b);
        assert!((d - 50.0).abs() < 1.0, "Expected ~50 m, got {} m", d);
    }

    #[test]
    fn test_antipodal_points_are_stable() {
        let north = coord(90.0, 0.0);
        let south = coord(-90.0, 0.0);
        let d = distance_meters(&north, &south);
        let half_circumference = std::f64::consts::PI * 6_371_000.0;
        assert!(d.is_finite());
        assert!((d - half_circumference).abs() < 1.0);
    }
}
