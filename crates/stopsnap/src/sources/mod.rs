//! File-backed stop and node sources.
//!
//! Stops come from GTFS `stops.txt` tables or GeoJSON point layers; network
//! nodes from delimited node tables or network batch files. The format is
//! picked from the path so callers only deal with [`StopFile`] and
//! [`load_nodes`].

pub mod geojson;
pub mod gtfs;
pub mod nodes;

use std::path::{Path, PathBuf};

use crate::models::traits::StopSource;
use crate::models::types::*;

pub use self::geojson::GeoJsonStops;
pub use self::gtfs::GtfsStopsFile;
pub use self::nodes::{load_nodes, read_batch_nodes, read_node_csv};

/// A stop file whose format was picked from its path
#[derive(Clone, Debug)]
pub enum StopFile {
    Gtfs(GtfsStopsFile),
    GeoJson(GeoJsonStops),
}

impl StopFile {
    /// `.geojson`/`.json` files are GeoJSON; directories and anything else
    /// are read as GTFS stop tables
    pub fn open(path: impl Into<PathBuf>, include_all_locations: bool) -> Self {
        let path = path.into();
        if has_extension(&path, &["geojson", "json"]) {
            Self::GeoJson(GeoJsonStops::new(path))
        } else {
            Self::Gtfs(GtfsStopsFile::new(path).include_all_locations(include_all_locations))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Gtfs(f) => f.path(),
            Self::GeoJson(f) => f.path(),
        }
    }
}

impl StopSource for StopFile {
    fn stops(&self) -> Result<Vec<Stop>> {
        match self {
            Self::Gtfs(f) => f.stops(),
            Self::GeoJson(f) => f.stops(),
        }
    }
}

pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Reject a second stop with an id already seen
pub(crate) fn check_unique(
    seen: &mut std::collections::HashSet<crate::identifiers::StopId>,
    stop: &Stop,
    record: impl FnOnce() -> String,
) -> Result<()> {
    if seen.insert(stop.id.clone()) {
        Ok(())
    } else {
        Err(MatchError::malformed(
            record(),
            format!("duplicate stop id {}", stop.id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert!(matches!(StopFile::open("stops.geojson", false), StopFile::GeoJson(_)));
        assert!(matches!(StopFile::open("stops.JSON", false), StopFile::GeoJson(_)));
        assert!(matches!(StopFile::open("stops.txt", false), StopFile::Gtfs(_)));
        assert!(matches!(StopFile::open("gtfs/", false), StopFile::Gtfs(_)));
    }
}
