//! GTFS `stops.txt` reader.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::models::traits::StopSource;
use crate::models::types::*;
use crate::sources::check_unique;

/// A GTFS stop table, given either as the file itself or as the feed directory
#[derive(Clone, Debug)]
pub struct GtfsStopsFile {
    path: PathBuf,
    include_all_locations: bool,
}

impl GtfsStopsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = if path.is_dir() {
            path.join("stops.txt")
        } else {
            path
        };
        Self {
            path,
            include_all_locations: false,
        }
    }

    /// Keep stations, entrances and generic nodes too
    pub fn include_all_locations(mut self, include: bool) -> Self {
        self.include_all_locations = include;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StopSource for GtfsStopsFile {
    fn stops(&self) -> Result<Vec<Stop>> {
        let file = File::open(&self.path)?;
        let stops = read_stops(
            file,
            &self.path.display().to_string(),
            self.include_all_locations,
        )?;
        info!("Loaded {} stops from {}", stops.len(), self.path.display());
        Ok(stops)
    }
}

#[derive(Deserialize)]
struct Record {
    stop_id: String,
    // Optional for generic nodes and boarding areas, so parsed only for kept rows
    #[serde(default)]
    stop_lon: Option<String>,
    #[serde(default)]
    stop_lat: Option<String>,
    #[serde(default)]
    stop_name: Option<String>,
    #[serde(default)]
    stop_desc: Option<String>,
    #[serde(default)]
    modes: Option<String>,
    #[serde(default)]
    location_type: Option<u8>,
}

/// Platforms/stops (0 or empty) and boarding areas (4) are boardable
fn is_boardable(location_type: Option<u8>) -> bool {
    matches!(location_type, None | Some(0) | Some(4))
}

fn parse_coordinate(value: Option<&str>, name: &str) -> std::result::Result<f64, String> {
    let value = value.ok_or_else(|| format!("missing {}", name))?;
    value
        .parse::<f64>()
        .map_err(|_| format!("{} {:?} is not a number", name, value))
}

/// Parse a stop table; `origin` names the source in error messages
pub fn read_stops<R: Read>(reader: R, origin: &str, include_all_locations: bool) -> Result<Vec<Stop>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    for required in ["stop_id", "stop_lon", "stop_lat"] {
        if !headers.iter().any(|h| h == required) {
            return Err(MatchError::malformed(
                format!("{} header", origin),
                format!("missing column {}", required),
            ));
        }
    }

    let mut stops = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0;
    let mut raw = csv::StringRecord::new();
    while reader.read_record(&mut raw)? {
        let line = raw.position().map(|p| p.line()).unwrap_or_default();
        let at = || format!("{} line {}", origin, line);

        let rec: Record = raw
            .deserialize(Some(&headers))
            .map_err(|e| MatchError::malformed(at(), e.to_string()))?;

        if !include_all_locations && !is_boardable(rec.location_type) {
            skipped += 1;
            continue;
        }
        if rec.stop_id.is_empty() {
            return Err(MatchError::malformed(at(), "empty stop_id"));
        }

        let lon = parse_coordinate(rec.stop_lon.as_deref(), "stop_lon")
            .map_err(|reason| MatchError::malformed(at(), reason))?;
        let lat = parse_coordinate(rec.stop_lat.as_deref(), "stop_lat")
            .map_err(|reason| MatchError::malformed(at(), reason))?;
        let geo = GeoPoint::new(lon, lat);
        if !geo.is_valid() {
            return Err(MatchError::malformed(
                at(),
                format!("coordinate ({}, {}) out of range", lon, lat),
            ));
        }

        let stop = Stop {
            name: rec.stop_name,
            description: rec.stop_desc,
            modes: rec.modes,
            ..Stop::new(rec.stop_id, geo)
        };
        check_unique(&mut seen, &stop, at)?;
        stops.push(stop);
    }

    if skipped > 0 {
        debug!("Skipped {} non-boardable locations in {}", skipped, origin);
    }
    Ok(stops)
}
