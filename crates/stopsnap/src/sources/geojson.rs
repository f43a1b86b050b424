//! GeoJSON point layer reader.
//!
//! Each feature is one stop. The id comes from the `StopID` or `stop_id`
//! property (string or number), falling back to the feature's own id.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ::geojson::{feature::Id, Feature, GeoJson, JsonValue, Value};
use log::info;

use crate::models::traits::StopSource;
use crate::models::types::*;
use crate::sources::check_unique;

const ID_KEYS: [&str; 2] = ["StopID", "stop_id"];
const NAME_KEYS: [&str; 2] = ["Name", "stop_name"];
const DESCRIPTION_KEYS: [&str; 2] = ["Description", "stop_desc"];
const MODES_KEYS: [&str; 2] = ["Modes", "modes"];

#[derive(Clone, Debug)]
pub struct GeoJsonStops {
    path: PathBuf,
}

impl GeoJsonStops {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StopSource for GeoJsonStops {
    fn stops(&self) -> Result<Vec<Stop>> {
        let text = fs::read_to_string(&self.path)?;
        let stops = parse_stops(&text, &self.path.display().to_string())?;
        info!("Loaded {} stops from {}", stops.len(), self.path.display());
        Ok(stops)
    }
}

/// Parse a FeatureCollection (or a lone Feature) of point stops
pub fn parse_stops(text: &str, origin: &str) -> Result<Vec<Stop>> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(MatchError::malformed(
                origin,
                "expected a FeatureCollection, found a bare geometry",
            ))
        }
    };

    let mut stops = Vec::with_capacity(features.len());
    let mut seen = HashSet::new();
    for (index, feature) in features.iter().enumerate() {
        let at = || format!("{} feature #{}", origin, index);
        let stop = stop_from_feature(feature).map_err(|reason| MatchError::malformed(at(), reason))?;
        check_unique(&mut seen, &stop, at)?;
        stops.push(stop);
    }
    Ok(stops)
}

fn stop_from_feature(feature: &Feature) -> std::result::Result<Stop, String> {
    let geometry = feature.geometry.as_ref().ok_or("missing geometry")?;
    let position = match &geometry.value {
        Value::Point(position) => position,
        Value::MultiPoint(points) => points.first().ok_or("empty MultiPoint")?,
        _ => return Err("geometry is not a point".into()),
    };
    if position.len() < 2 {
        return Err("point needs at least two coordinates".into());
    }

    let geo = GeoPoint::new(position[0], position[1]);
    if !geo.is_valid() {
        return Err(format!(
            "coordinate ({}, {}) out of range",
            position[0], position[1]
        ));
    }

    let id = property(feature, &ID_KEYS)
        .and_then(scalar_to_string)
        .or_else(|| match &feature.id {
            Some(Id::String(s)) => Some(s.clone()),
            Some(Id::Number(n)) => Some(n.to_string()),
            None => None,
        })
        .filter(|id| !id.is_empty())
        .ok_or("missing stop id")?;

    let text = |keys: &[&str]| property(feature, keys).and_then(scalar_to_string);
    Ok(Stop {
        name: text(&NAME_KEYS),
        description: text(&DESCRIPTION_KEYS),
        modes: text(&MODES_KEYS),
        ..Stop::new(id, geo)
    })
}

/// First of `keys` present with a non-null value
fn property<'a>(feature: &'a Feature, keys: &[&str]) -> Option<&'a JsonValue> {
    let properties = feature.properties.as_ref()?;
    keys.iter()
        .filter_map(|key| properties.get(*key))
        .find(|value| !value.is_null())
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(features: &str) -> String {
        format!(r#"{{"type": "FeatureCollection", "features": [{}]}}"#, features)
    }

    #[test]
    fn test_reads_point_features() {
        let text = collection(
            r#"
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-79.3806, 43.6453]},
             "properties": {"StopID": "1001", "Name": "Union", "Modes": "bs"}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-79.3779, 43.6490]},
             "properties": {"stop_id": 1002}}
            "#,
        );
        let stops = parse_stops(&text, "stops.geojson").unwrap();

        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].id.as_str(), "1001");
        assert_eq!(stops[0].name.as_deref(), Some("Union"));
        assert_eq!(stops[0].modes.as_deref(), Some("bs"));
        assert_eq!(stops[0].geo, GeoPoint::new(-79.3806, 43.6453));
        assert_eq!(stops[1].id.as_str(), "1002");
        assert_eq!(stops[1].name, None);
    }

    #[test]
    fn test_multipoint_and_feature_id() {
        let text = collection(
            r#"
            {"type": "Feature", "id": "f7",
             "geometry": {"type": "MultiPoint", "coordinates": [[2.2945, 48.8584], [2.0, 48.0]]},
             "properties": {}}
            "#,
        );
        let stops = parse_stops(&text, "x").unwrap();
        assert_eq!(stops[0].id.as_str(), "f7");
        assert_eq!(stops[0].geo, GeoPoint::new(2.2945, 48.8584));
    }

    #[test]
    fn test_malformed_features_name_index() {
        let missing_geometry = collection(
            r#"
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}, "properties": {"StopID": "a"}},
            {"type": "Feature", "geometry": null, "properties": {"StopID": "b"}}
            "#,
        );
        match parse_stops(&missing_geometry, "stops.geojson") {
            Err(MatchError::MalformedInput { record, reason }) => {
                assert_eq!(record, "stops.geojson feature #1");
                assert_eq!(reason, "missing geometry");
            }
            other => panic!("Expected malformed input, got {:?}", other),
        }

        let missing_id = collection(
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}, "properties": {"Name": "x"}}"#,
        );
        assert!(parse_stops(&missing_id, "x").is_err());

        let line = collection(
            r#"{"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}, "properties": {"StopID": "a"}}"#,
        );
        assert!(parse_stops(&line, "x").is_err());
    }

    #[test]
    fn test_duplicate_ids() {
        let text = collection(
            r#"
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}, "properties": {"StopID": "a"}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}, "properties": {"stop_id": "a"}}
            "#,
        );
        assert!(matches!(
            parse_stops(&text, "x"),
            Err(MatchError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_not_geojson() {
        assert!(matches!(
            parse_stops("{\"hello\": 1}", "x"),
            Err(MatchError::GeoJson(_))
        ));
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stops.geojson");
        fs::write(
            &path,
            collection(
                r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [151.2093, -33.8688]}, "properties": {"StopID": 7}}"#,
            ),
        )
        .unwrap();

        let stops = GeoJsonStops::new(&path).stops().unwrap();
        assert_eq!(stops[0].id.as_str(), "7");
    }
}
