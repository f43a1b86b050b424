//! # stopsnap
//!
//! Match external transit stops to the nearest node of a planar network.
//!
//! ## Features
//!
//! - **Projection**: WGS84 to UTM, zone given directly or read from a `.prj`
//! - **Spatial queries**: Uniform grid with exact ring search, or an R-tree
//! - **Explicit outcomes**: Every stop yields one record; stops without a
//!   node are reported, never dropped
//! - **File formats**: GTFS stops, GeoJSON points, node tables and network
//!   batch files in; a CSV correspondence table out (`io` feature)
//!
//! ## Example
//!
//! ```
//! use stopsnap::prelude::*;
//!
//! let zone: UtmZone = "17N".parse().unwrap();
//! let projector = UtmProjector::new(zone).unwrap();
//! let union_station = GeoPoint::new(-79.3806, 43.6453);
//! let at = projector.project_one(union_station).unwrap();
//!
//! let nodes = NodeTable::from_nodes(vec![
//!     NetworkNode::new(10, at.x + 30.0, at.y + 40.0),
//!     NetworkNode::new(11, at.x - 500.0, at.y),
//! ])
//! .unwrap();
//! let stops = vec![Stop::new("union", union_station)];
//!
//! let matcher = Matcher::new(projector, MatchConfig::default()).unwrap();
//! let report = matcher.run(&stops, &nodes).unwrap();
//! assert_eq!(report.records[0].matched_node_id(), Some(NodeId(10)));
//! ```

pub mod config;
pub mod identifiers;
pub mod matcher;
pub mod models;
pub mod network;
pub mod projection;
pub mod spatial;

#[cfg(feature = "io")]
pub mod output;
#[cfg(feature = "io")]
pub mod sources;

// Re-exports for convenience
pub mod prelude {
    pub use crate::config::{GridResolution, IndexKind, MatchConfig};
    pub use crate::identifiers::*;
    pub use crate::matcher::{MatchReport, MatchSummary, Matcher};
    pub use crate::models::{traits::*, types::*};
    pub use crate::network::NodeTable;
    pub use crate::projection::{Hemisphere, UtmProjector, UtmZone};
    pub use crate::spatial::{Domain, GridIndex, Nearest, NearestIndex, RTreeIndex};

    #[cfg(feature = "io")]
    pub use crate::output::{write_correspondence, CorrespondenceWriter};
    #[cfg(feature = "io")]
    pub use crate::sources::{load_nodes, GeoJsonStops, GtfsStopsFile, StopFile};
}

pub use prelude::*;
