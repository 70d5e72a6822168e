// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracked-location catalog loading and nearest-match lookup.

use crate::geo::distance_meters;
use crate::models::{Coordinate, TrackedLocation};
use geojson::GeoJson;
use std::fs;
use std::path::Path;

/// Read-only catalog of tracked locations.
#[derive(Default, Clone)]
pub struct LocationCatalog {
    locations: Vec<TrackedLocation>,
}

impl LocationCatalog {
    /// Load the catalog from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a GeoJSON string.
    ///
    /// Expects a FeatureCollection of Point features carrying `id`,
    /// `name` and `target_hours` properties. Features missing `id` or a
    /// positive `target_hours` are skipped (unfinished catalog entries).
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| CatalogError::ParseError(e.to_string()))?;

        let mut locations: Vec<TrackedLocation> = Vec::new();

        if let GeoJson::FeatureCollection(collection) = geojson {
            for feature in collection.features {
                let id = match feature.property("id").and_then(|v| v.as_str()) {
                    Some(id) => id.to_string(),
                    None => {
                        tracing::warn!("Skipping catalog feature without id");
                        continue;
                    }
                };

                let name = feature
                    .property("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown")
                    .to_string();

                let target_hours = feature
                    .property("target_hours")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
                if target_hours <= 0.0 {
                    tracing::warn!(id = %id, "Skipping catalog feature without positive target_hours");
                    continue;
                }

                if locations.iter().any(|l| l.id == id) {
                    tracing::warn!(id = %id, "Skipping duplicate catalog id");
                    continue;
                }

                if let Some(geom) = feature.geometry {
                    let coordinate = Self::convert_point(geom.value)?;
                    locations.push(TrackedLocation {
                        id,
                        name,
                        coordinate,
                        target_hours,
                    });
                }
            }
        }

        tracing::info!(count = locations.len(), "Loaded tracked locations");
        Ok(Self { locations })
    }

    /// Build a catalog directly from locations (tests, embedded catalogs).
    pub fn from_locations(locations: Vec<TrackedLocation>) -> Self {
        Self { locations }
    }

    /// Convert a GeoJSON geometry to a coordinate.
    fn convert_point(value: geojson::Value) -> Result<Coordinate, CatalogError> {
        match value {
            // GeoJSON positions are [longitude, latitude, ...]
            geojson::Value::Point(position) if position.len() >= 2 => Ok(Coordinate {
                latitude: position[1],
                longitude: position[0],
            }),
            _ => Err(CatalogError::UnsupportedGeometry),
        }
    }

    /// Get the list of tracked locations.
    pub fn locations(&self) -> &[TrackedLocation] {
        &self.locations
    }

    /// Look up a location by id.
    pub fn get(&self, id: &str) -> Option<&TrackedLocation> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Strictly nearest location within `radius_meters` of a coordinate.
    ///
    /// Ties on exact equal distance resolve to catalog order.
    pub fn nearest_within(
        &self,
        coordinate: &Coordinate,
        radius_meters: f64,
    ) -> Option<(&TrackedLocation, f64)> {
        let mut best: Option<(&TrackedLocation, f64)> = None;
        for location in &self.locations {
            let d = distance_meters(coordinate, &location.coordinate);
            if d <= radius_meters && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((location, d));
            }
        }
        best
    }
}

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Unsupported geometry type (expected Point)")]
    UnsupportedGeometry,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"id": "dolores-park", "name": "Dolores Park", "target_hours": 0.167},
                "geometry": {"type": "Point", "coordinates": [-122.4270, 37.7596]}
            },
            {
                "type": "Feature",
                "properties": {"id": "ferry-building", "name": "Ferry Building", "target_hours": 1.0},
                "geometry": {"type": "Point", "coordinates": [-122.3933, 37.7955]}
            },
            {
                "type": "Feature",
                "properties": {"name": "No Id Cafe", "target_hours": 1.0},
                "geometry": {"type": "Point", "coordinates": [-122.40, 37.78]}
            },
            {
                "type": "Feature",
                "properties": {"id": "no-target", "name": "No Target"},
                "geometry": {"type": "Point", "coordinates": [-122.41, 37.77]}
            }
        ]
    }"#;

    #[test]
    fn test_load_skips_incomplete_features() {
        let catalog = LocationCatalog::load_from_json(CATALOG_JSON).expect("Catalog should parse");
        let ids: Vec<&str> = catalog.locations().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["dolores-park", "ferry-building"]);
    }

    #[test]
    fn test_non_point_geometry_is_rejected() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"id": "poly", "name": "Poly", "target_hours": 1.0},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[0,1],[1,1],[0,0]]]}
            }]
        }"#;
        let result = LocationCatalog::load_from_json(json);
        assert!(matches!(result, Err(CatalogError::UnsupportedGeometry)));
    }

    #[test]
    fn test_get_by_id() {
        let catalog = LocationCatalog::load_from_json(CATALOG_JSON).expect("Catalog should parse");
        assert_eq!(
            catalog.get("dolores-park").map(|l| l.name.as_str()),
            Some("Dolores Park")
        );
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_nearest_within_picks_strictly_nearest() {
        let near = TrackedLocation {
            id: "near".to_string(),
            name: "Near".to_string(),
            coordinate: Coordinate {
                latitude: 37.00010,
                longitude: -122.0,
            },
            target_hours: 1.0,
        };
        let nearer = TrackedLocation {
            id: "nearer".to_string(),
            name: "Nearer".to_string(),
            coordinate: Coordinate {
                latitude: 37.00005,
                longitude: -122.0,
            },
            target_hours: 1.0,
        };
        let catalog = LocationCatalog::from_locations(vec![near, nearer]);

        let here = Coordinate {
            latitude: 37.0,
            longitude: -122.0,
        };
        let (found, d) = catalog
            .nearest_within(&here, 50.0)
            .expect("Should match a location");
        assert_eq!(found.id, "nearer");
        assert!(d < 10.0);
    }

    #[test]
    fn test_nearest_within_respects_radius() {
        let far = TrackedLocation {
            id: "far".to_string(),
            name: "Far".to_string(),
            coordinate: Coordinate {
                latitude: 37.01,
                longitude: -122.0,
            },
            target_hours: 1.0,
        };
        let catalog = LocationCatalog::from_locations(vec![far]);

        let here = Coordinate {
            latitude: 37.0,
            longitude: -122.0,
        };
        assert!(catalog.nearest_within(&here, 50.0).is_none());
    }
}
