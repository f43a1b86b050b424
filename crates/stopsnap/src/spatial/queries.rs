//! Candidate ordering shared by every index, plus the exhaustive scan the
//! indices are checked against.

use std::cmp::Ordering;

use crate::identifiers::NodeId;
use crate::models::types::{NetworkNode, PlanarPoint};

/// A node reference returned by a nearest query
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub id: NodeId,
    pub point: PlanarPoint,
    /// Euclidean distance to the query point
    pub distance: f64,
}

/// Orders candidates by squared distance to the query, then by lowest id
pub fn compare_candidates(a: (f64, NodeId), b: (f64, NodeId)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

/// O(n) nearest node, same tie-break as the indices
pub fn nearest_by_scan(nodes: &[NetworkNode], query: PlanarPoint) -> Option<Candidate> {
    nodes
        .iter()
        .map(|n| (n.planar.distance_2(&query), n))
        .min_by(|a, b| compare_candidates((a.0, a.1.id), (b.0, b.1.id)))
        .map(|(d2, n)| Candidate {
            id: n.id,
            point: n.planar,
            distance: d2.sqrt(),
        })
}
