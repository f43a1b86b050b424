use anyhow::{Context, Result};
use geo::{Coord, LineString, Point};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use std::path::Path;
use stopsnap::prelude::*;

fn outcome_name(outcome: &MatchOutcome) -> &'static str {
    match outcome {
        MatchOutcome::Matched { .. } => "matched",
        MatchOutcome::IndexEmpty => "nothing_found",
        MatchOutcome::NullReference(_) => "null_reference",
    }
}

/// Stop-to-node connector for matched stops, the bare stop otherwise
fn record_to_geojson(record: &CorrespondenceRecord) -> Value {
    match record.outcome {
        MatchOutcome::Matched { node, .. } => {
            let line = LineString::new(vec![Coord::from(record.stop), Coord::from(node.planar)]);
            Value::from(&line)
        }
        _ => Value::from(&Point::from(Coord::from(record.stop))),
    }
}

/// Create a GeoJSON Feature from a correspondence record
fn record_to_feature(record: &CorrespondenceRecord) -> Feature {
    let mut properties = serde_json::Map::new();
    properties.insert("stop_id".to_string(), serde_json::json!(record.stop_id.as_str()));
    properties.insert(
        "node_id".to_string(),
        match record.outcome {
            MatchOutcome::Matched { node, .. } => serde_json::json!(node.id.0),
            _ => serde_json::Value::Null,
        },
    );
    properties.insert(
        "outcome".to_string(),
        serde_json::json!(outcome_name(&record.outcome)),
    );
    properties.insert(
        "distance".to_string(),
        match record.outcome {
            MatchOutcome::Matched { distance, .. } => serde_json::json!(distance),
            _ => serde_json::Value::Null,
        },
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(record_to_geojson(record))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Write a review layer in planar coordinates, one feature per record
pub fn write_review_geojson(records: &[CorrespondenceRecord], output_path: &Path) -> Result<()> {
    log::info!(
        "Writing {} review features to {}",
        records.len(),
        output_path.display()
    );

    let feature_collection = FeatureCollection {
        bbox: None,
        features: records.iter().map(record_to_feature).collect(),
        foreign_members: None,
    };

    let geojson = GeoJson::from(feature_collection);
    let json_string = serde_json::to_string_pretty(&geojson)
        .context("Failed to serialize GeoJSON")?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write GeoJSON to {}", output_path.display()))?;

    Ok(())
}
