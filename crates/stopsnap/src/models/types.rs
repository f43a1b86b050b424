//! Core data types for stop-to-node matching.

use geo::{Coord, Point};

use crate::identifiers::*;

// ============================================================================
// Coordinates
// ============================================================================

/// Geographic WGS84 coordinate in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Inside the ±180° / ±90° domain and finite
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<Point> for GeoPoint {
    fn from(p: Point) -> Self {
        Self::new(p.x(), p.y())
    }
}

impl From<GeoPoint> for Point {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lon, p.lat)
    }
}

/// Planar coordinate in the network's linear unit
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    pub fn distance(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn distance_2(&self, other: &PlanarPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<Coord> for PlanarPoint {
    fn from(c: Coord) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<PlanarPoint> for Coord {
    fn from(p: PlanarPoint) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

impl From<(f64, f64)> for PlanarPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// An external transit stop, read-only once loaded
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub geo: GeoPoint,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Served modes as given by the source (e.g. "bl" or "Bus;Rail")
    pub modes: Option<String>,
}

impl Stop {
    pub fn new(id: impl Into<StopId>, geo: GeoPoint) -> Self {
        Self {
            id: id.into(),
            geo,
            name: None,
            description: None,
            modes: None,
        }
    }
}

/// A node of the planar network
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkNode {
    pub id: NodeId,
    pub planar: PlanarPoint,
    /// Zone centroids are never offered for matching
    pub is_centroid: bool,
}

impl NetworkNode {
    pub fn new(id: impl Into<NodeId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            planar: PlanarPoint::new(x, y),
            is_centroid: false,
        }
    }

    pub fn centroid(id: impl Into<NodeId>, x: f64, y: f64) -> Self {
        Self {
            is_centroid: true,
            ..Self::new(id, x, y)
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// How a single stop was resolved against the network
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchOutcome {
    /// Nearest node found and resolved
    Matched { node: NetworkNode, distance: f64 },
    /// Nothing was ever inserted into the index
    IndexEmpty,
    /// The index returned this id, but the node source no longer knows it
    NullReference(NodeId),
}

impl MatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// One row of the correspondence table
#[derive(Clone, Debug, PartialEq)]
pub struct CorrespondenceRecord {
    pub stop_id: StopId,
    /// The stop's projected position
    pub stop: PlanarPoint,
    pub outcome: MatchOutcome,
}

impl CorrespondenceRecord {
    /// Placeholder node coordinates when the index held nothing
    pub const EMPTY_PLACEHOLDER: PlanarPoint = PlanarPoint::new(-1.0, -1.0);
    /// Placeholder node coordinates for a reference that resolved to nothing
    pub const NULL_PLACEHOLDER: PlanarPoint = PlanarPoint::new(0.0, 0.0);

    pub fn matched_node_id(&self) -> Option<NodeId> {
        match self.outcome {
            MatchOutcome::Matched { node, .. } => Some(node.id),
            _ => None,
        }
    }

    pub fn node_point(&self) -> PlanarPoint {
        match self.outcome {
            MatchOutcome::Matched { node, .. } => node.planar,
            MatchOutcome::IndexEmpty => Self::EMPTY_PLACEHOLDER,
            MatchOutcome::NullReference(_) => Self::NULL_PLACEHOLDER,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed input at {record}: {reason}")]
    MalformedInput { record: String, reason: String },

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Projection failed for point #{index}: {reason}")]
    Projection { index: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "io")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "io")]
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

impl MatchError {
    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
