//! Taxi-zone geometry lookup.
//!
//! Loads the NYC taxi-zones GeoJSON and exposes a zone-id to
//! name/center-coordinate mapping for annotating flattened zone flows.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{Feature, GeoJson, Value};
use serde::Serialize;
use tracing::{debug, info};

/// Display metadata for one taxi zone. Both fields are optional: the
/// upstream GeoJSON does not guarantee either.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneInfo {
    pub name: Option<String>,
    /// Zone center as a `[longitude, latitude]` pair.
    pub center: Option<[f64; 2]>,
}

/// Read-only mapping from zone id to [`ZoneInfo`].
#[derive(Debug, Default)]
pub struct ZoneLookup {
    zones: HashMap<String, ZoneInfo>,
}

impl ZoneLookup {
    /// Builds the lookup from a GeoJSON `FeatureCollection` file.
    ///
    /// A feature's id comes from its `location_id` (or `LocationID`)
    /// property and its display name from the `zone` property. Features
    /// without a usable id are skipped, not treated as errors.
    pub fn from_geojson_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading zone geometry file {}", path.display()))?;
        let geojson: GeoJson = content
            .parse()
            .with_context(|| format!("parsing zone geometry file {}", path.display()))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            anyhow::bail!(
                "zone geometry file {} is not a FeatureCollection",
                path.display()
            );
        };

        let mut zones = HashMap::new();
        for feature in &collection.features {
            let Some(id) = zone_id(feature) else {
                debug!("skipping zone feature without a location id");
                continue;
            };

            let name = feature
                .property("zone")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let center = feature_center(feature);

            zones.insert(id, ZoneInfo { name, center });
        }

        info!(zone_count = zones.len(), path = %path.display(), "Zone geometry loaded");
        Ok(ZoneLookup { zones })
    }

    pub fn get(&self, zone_id: &str) -> Option<&ZoneInfo> {
        self.zones.get(zone_id)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Extracts the zone id, tolerating both the snake_case and the original
/// shapefile-style property name, and both string and numeric encodings.
fn zone_id(feature: &Feature) -> Option<String> {
    let value = feature
        .property("location_id")
        .or_else(|| feature.property("LocationID"))?;

    if let Some(s) = value.as_str() {
        return Some(s.to_string());
    }
    value.as_u64().map(|n| n.to_string())
}

/// The zone's center coordinate: the precomputed `center` property when
/// present, otherwise the arithmetic mean of every ring coordinate in the
/// zone polygon.
fn feature_center(feature: &Feature) -> Option<[f64; 2]> {
    if let Some(center) = feature.property("center").and_then(|v| v.as_array()) {
        if let [lon, lat] = center.as_slice() {
            if let (Some(lon), Some(lat)) = (lon.as_f64(), lat.as_f64()) {
                return Some([lon, lat]);
            }
        }
    }

    let geometry = feature.geometry.as_ref()?;
    let mut sum = [0.0f64, 0.0f64];
    let mut count = 0usize;

    let mut push_ring = |ring: &Vec<Vec<f64>>| {
        for position in ring {
            if let [lon, lat, ..] = position.as_slice() {
                sum[0] += lon;
                sum[1] += lat;
                count += 1;
            }
        }
    };

    match &geometry.value {
        Value::Polygon(rings) => {
            for ring in rings {
                push_ring(ring);
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                for ring in rings {
                    push_ring(ring);
                }
            }
        }
        _ => return None,
    }

    if count == 0 {
        return None;
    }
    Some([sum[0] / count as f64, sum[1] / count as f64])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn write_temp_geojson(name: &str, content: &str) -> String {
        let path = format!("{}/{}", env::temp_dir().display(), name);
        fs::write(&path, content).unwrap();
        path
    }

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"location_id": "4", "zone": "Alphabet City"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-73.98, 40.72], [-73.97, 40.72], [-73.97, 40.73], [-73.98, 40.73]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"LocationID": 12, "zone": "Battery Park", "center": [-74.016, 40.703]},
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": {"zone": "No Id Zone"},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_lookup_by_string_and_numeric_id() {
        let path = write_temp_geojson("nyc_taxi_trips_zones_ids.geojson", SAMPLE);
        let lookup = ZoneLookup::from_geojson_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(lookup.len(), 2);
        assert_eq!(
            lookup.get("4").unwrap().name.as_deref(),
            Some("Alphabet City")
        );
        assert_eq!(
            lookup.get("12").unwrap().name.as_deref(),
            Some("Battery Park")
        );
        assert!(lookup.get("264").is_none());
    }

    #[test]
    fn test_precomputed_center_property_wins() {
        let path = write_temp_geojson("nyc_taxi_trips_zones_center.geojson", SAMPLE);
        let lookup = ZoneLookup::from_geojson_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(lookup.get("12").unwrap().center, Some([-74.016, 40.703]));
    }

    #[test]
    fn test_center_falls_back_to_ring_mean() {
        let path = write_temp_geojson("nyc_taxi_trips_zones_mean.geojson", SAMPLE);
        let lookup = ZoneLookup::from_geojson_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let center = lookup.get("4").unwrap().center.unwrap();
        assert!((center[0] - -73.975).abs() < 1e-9);
        assert!((center[1] - 40.725).abs() < 1e-9);
    }

    #[test]
    fn test_non_collection_geojson_is_an_error() {
        let path = write_temp_geojson(
            "nyc_taxi_trips_zones_bad.geojson",
            r#"{"type": "Feature", "properties": {}, "geometry": null}"#,
        );
        let result = ZoneLookup::from_geojson_file(&path);
        fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
