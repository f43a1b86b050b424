//! Spatial indexing over network nodes.
//!
//! Two interchangeable indices answer nearest-node queries: a uniform grid
//! with ring search ([`GridIndex`]) and an R-tree ([`RTreeIndex`]). Both hold
//! node ids and cached coordinates only; the node itself is resolved through
//! the node source afterwards.

pub mod domain;
pub mod grid;
pub mod index;
pub mod queries;

pub use domain::Domain;
pub use grid::{CellStats, GridIndex};
pub use index::RTreeIndex;
pub use queries::{nearest_by_scan, Candidate};

use crate::models::types::{NetworkNode, PlanarPoint};

/// Result of a nearest query
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Nearest {
    Found(Candidate),
    /// The index holds no nodes
    Empty,
}

impl Nearest {
    pub fn found(self) -> Option<Candidate> {
        match self {
            Self::Found(c) => Some(c),
            Self::Empty => None,
        }
    }
}

/// A point index answering nearest-node queries
///
/// Construction and queries are separate phases: once every node is inserted
/// the index is only read, so it can be shared across threads.
pub trait NearestIndex: Send + Sync {
    fn insert(&mut self, node: &NetworkNode);

    /// Closest node by Euclidean distance, ties broken by lowest id
    fn nearest(&self, query: PlanarPoint) -> Nearest;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
