//! R-tree nodes for spatial indexing.
//!
//! Wraps network node references with their planar position so `rstar` can
//! answer nearest queries. Used as an alternative to the grid when the node
//! distribution is very uneven, and as an independent check on it.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::identifiers::NodeId;
use crate::models::types::{NetworkNode, PlanarPoint};
use crate::spatial::queries::{compare_candidates, Candidate};
use crate::spatial::{Nearest, NearestIndex};

// ============================================================================
// Node Spatial Entry
// ============================================================================

#[derive(Clone, Debug)]
pub struct NodeEntry {
    pub id: NodeId,
    point: [f64; 2],
}

impl NodeEntry {
    pub fn new(node: &NetworkNode) -> Self {
        Self {
            id: node.id,
            point: [node.planar.x, node.planar.y],
        }
    }

    pub fn planar(&self) -> PlanarPoint {
        PlanarPoint::new(self.point[0], self.point[1])
    }
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ============================================================================
// R-tree Index
// ============================================================================

#[derive(Clone, Default)]
pub struct RTreeIndex {
    tree: RTree<NodeEntry>,
}

impl RTreeIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build from a full node set at once
    pub fn bulk_load(nodes: &[NetworkNode]) -> Self {
        Self {
            tree: RTree::bulk_load(nodes.iter().map(NodeEntry::new).collect()),
        }
    }
}

impl NearestIndex for RTreeIndex {
    fn insert(&mut self, node: &NetworkNode) {
        self.tree.insert(NodeEntry::new(node));
    }

    fn nearest(&self, query: PlanarPoint) -> Nearest {
        let q = [query.x, query.y];

        // The iterator yields in ascending distance; walk the tied prefix to
        // apply the lowest-id rule
        let mut best: Option<(f64, &NodeEntry)> = None;
        for entry in self.tree.nearest_neighbor_iter(&q) {
            let d2 = entry.distance_2(&q);
            match best {
                Some((best_d2, _)) if d2 > best_d2 => break,
                Some((best_d2, best_entry))
                    if compare_candidates((d2, entry.id), (best_d2, best_entry.id)).is_ge() => {}
                _ => best = Some((d2, entry)),
            }
        }

        match best {
            Some((d2, entry)) => Nearest::Found(Candidate {
                id: entry.id,
                point: entry.planar(),
                distance: d2.sqrt(),
            }),
            None => Nearest::Empty,
        }
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{nearest_by_scan, Domain, GridIndex};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_empty_tree() {
        let index = RTreeIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.nearest(PlanarPoint::new(1.0, 2.0)), Nearest::Empty);
    }

    #[test]
    fn test_ties_go_to_lowest_id() {
        let nodes = vec![
            NetworkNode::new(30, 1.0, 0.0),
            NetworkNode::new(20, 0.0, -1.0),
            NetworkNode::new(10, 0.0, 1.0),
            NetworkNode::new(5, 3.0, 3.0),
        ];
        let index = RTreeIndex::bulk_load(&nodes);

        let hit = index.nearest(PlanarPoint::new(0.0, 0.0)).found().unwrap();
        assert_eq!(hit.id, NodeId(10));
        assert_eq!(hit.distance, 1.0);
    }

    #[test]
    fn test_agrees_with_grid_and_scan() {
        let mut rng = StdRng::seed_from_u64(11);
        let nodes: Vec<NetworkNode> = (0..1_000u64)
            .map(|i| {
                NetworkNode::new(
                    i,
                    rng.random_range(600_000.0..620_000.0),
                    rng.random_range(4_800_000.0..4_830_000.0),
                )
            })
            .collect();

        let mut tree = RTreeIndex::new();
        let domain = Domain::enclosing(nodes.iter().map(|n| n.planar), 1.0).unwrap();
        let mut grid = GridIndex::new(domain, 100, 150).unwrap();
        for n in &nodes {
            tree.insert(n);
            grid.insert(n);
        }
        assert_eq!(tree.len(), 1_000);

        for _ in 0..500 {
            let q = PlanarPoint::new(
                rng.random_range(600_000.0..620_000.0),
                rng.random_range(4_800_000.0..4_830_000.0),
            );
            let expected = nearest_by_scan(&nodes, q).map(|c| c.id);
            assert_eq!(tree.nearest(q).found().map(|c| c.id), expected);
            assert_eq!(grid.nearest(q).found().map(|c| c.id), expected);
        }
    }
}
