//! Uniform grid index with ring search.
//!
//! The domain is cut into `cells_x × cells_y` equal cells. Each node is
//! bucketed into exactly one cell. A nearest query starts in the query's home
//! cell and walks outward one square ring of cells at a time, tracking the
//! best candidate seen. It stops once the closest possible point of the next
//! ring is farther than that candidate, so a node sitting several empty rings
//! away is still found, and a nearer node in a later ring is never skipped.

use crate::identifiers::NodeId;
use crate::models::types::*;
use crate::spatial::domain::Domain;
use crate::spatial::queries::{compare_candidates, Candidate};
use crate::spatial::{Nearest, NearestIndex};

// Relative slack on ring distance bounds to absorb rounding in cell edges
const BOUND_SLACK: f64 = 1e-9;

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: NodeId,
    point: PlanarPoint,
}

/// Occupancy summary of a grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellStats {
    pub cells: usize,
    pub occupied: usize,
    pub max_bucket: usize,
}

#[derive(Clone, Debug)]
pub struct GridIndex {
    domain: Domain,
    cells_x: usize,
    cells_y: usize,
    cell_w: f64,
    cell_h: f64,
    // Row-major, `cells_y` rows of `cells_x`
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl GridIndex {
    pub fn new(domain: Domain, cells_x: usize, cells_y: usize) -> Result<Self> {
        if cells_x == 0 || cells_y == 0 {
            return Err(MatchError::InvalidDomain(format!(
                "grid needs at least one cell per axis, got {} x {}",
                cells_x, cells_y
            )));
        }
        if domain.width() <= 0.0 || domain.height() <= 0.0 {
            return Err(MatchError::InvalidDomain(format!(
                "domain has no area ({} x {})",
                domain.width(),
                domain.height()
            )));
        }

        Ok(Self {
            domain,
            cells_x,
            cells_y,
            cell_w: domain.width() / cells_x as f64,
            cell_h: domain.height() / cells_y as f64,
            buckets: vec![Vec::new(); cells_x * cells_y],
            len: 0,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cells_x, self.cells_y)
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_w, self.cell_h)
    }

    /// Cell containing `p`; points on or past the outer edge are clamped in
    pub fn cell_of(&self, p: PlanarPoint) -> (usize, usize) {
        (
            axis_cell(p.x, self.domain.min_x(), self.cell_w, self.cells_x),
            axis_cell(p.y, self.domain.min_y(), self.cell_h, self.cells_y),
        )
    }

    pub fn cell_stats(&self) -> CellStats {
        let mut stats = CellStats {
            cells: self.buckets.len(),
            ..Default::default()
        };
        for bucket in self.buckets.iter().filter(|b| !b.is_empty()) {
            stats.occupied += 1;
            stats.max_bucket = stats.max_bucket.max(bucket.len());
        }
        stats
    }

    fn bucket(&self, cx: usize, cy: usize) -> &[Entry] {
        &self.buckets[cy * self.cells_x + cx]
    }

    /// Lower bound on the distance from `q` to any cell of ring `r` around
    /// `(hx, hy)`, considering only sides of the ring that lie in the grid.
    /// Infinite when the whole ring falls outside.
    fn ring_bound(&self, q: PlanarPoint, (hx, hy): (usize, usize), r: usize) -> f64 {
        let mut bound = f64::INFINITY;

        if hx >= r {
            let edge = self.domain.min_x() + (hx + 1 - r) as f64 * self.cell_w;
            bound = bound.min(q.x - edge);
        }
        if hx + r < self.cells_x {
            let edge = self.domain.min_x() + (hx + r) as f64 * self.cell_w;
            bound = bound.min(edge - q.x);
        }
        if hy >= r {
            let edge = self.domain.min_y() + (hy + 1 - r) as f64 * self.cell_h;
            bound = bound.min(q.y - edge);
        }
        if hy + r < self.cells_y {
            let edge = self.domain.min_y() + (hy + r) as f64 * self.cell_h;
            bound = bound.min(edge - q.y);
        }

        bound
    }

    /// Visit every in-grid cell whose Chebyshev distance from the home cell is `r`
    fn visit_ring(&self, (hx, hy): (usize, usize), r: usize, mut visit: impl FnMut(&[Entry])) {
        if r == 0 {
            visit(self.bucket(hx, hy));
            return;
        }

        let (hx, hy, r) = (hx as isize, hy as isize, r as isize);
        let (max_x, max_y) = (self.cells_x as isize - 1, self.cells_y as isize - 1);
        let (x0, x1, y0, y1) = (hx - r, hx + r, hy - r, hy + r);

        // Bottom and top rows, corners included
        for cx in x0.max(0)..=x1.min(max_x) {
            if y0 >= 0 {
                visit(self.bucket(cx as usize, y0 as usize));
            }
            if y1 <= max_y {
                visit(self.bucket(cx as usize, y1 as usize));
            }
        }
        // Left and right columns between them
        for cy in (y0 + 1).max(0)..=(y1 - 1).min(max_y) {
            if x0 >= 0 {
                visit(self.bucket(x0 as usize, cy as usize));
            }
            if x1 <= max_x {
                visit(self.bucket(x1 as usize, cy as usize));
            }
        }
    }
}

impl NearestIndex for GridIndex {
    fn insert(&mut self, node: &NetworkNode) {
        let (cx, cy) = self.cell_of(node.planar);
        self.buckets[cy * self.cells_x + cx].push(Entry {
            id: node.id,
            point: node.planar,
        });
        self.len += 1;
    }

    fn nearest(&self, query: PlanarPoint) -> Nearest {
        if self.len == 0 {
            return Nearest::Empty;
        }

        let home = self.cell_of(query);
        let slack = BOUND_SLACK * self.cell_w.min(self.cell_h);
        let max_ring = self.cells_x.max(self.cells_y);

        // (squared distance, entry)
        let mut best: Option<(f64, Entry)> = None;

        for r in 0..=max_ring {
            if r > 0 {
                let bound = self.ring_bound(query, home, r);
                if bound.is_infinite() {
                    break;
                }
                if let Some((best_d2, _)) = best {
                    if bound - slack > best_d2.sqrt() {
                        break;
                    }
                }
            }

            self.visit_ring(home, r, |bucket| {
                for entry in bucket {
                    let d2 = entry.point.distance_2(&query);
                    let better = match &best {
                        None => true,
                        Some((best_d2, best_entry)) => compare_candidates(
                            (d2, entry.id),
                            (*best_d2, best_entry.id),
                        )
                        .is_lt(),
                    };
                    if better {
                        best = Some((d2, *entry));
                    }
                }
            });
        }

        match best {
            Some((d2, entry)) => Nearest::Found(Candidate {
                id: entry.id,
                point: entry.point,
                distance: d2.sqrt(),
            }),
            None => Nearest::Empty,
        }
    }

    fn len(&self) -> usize {
        self.len
    }
}

fn axis_cell(value: f64, min: f64, size: f64, count: usize) -> usize {
    let raw = ((value - min) / size).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else if raw >= count as f64 {
        count - 1
    } else {
        raw as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::queries::nearest_by_scan;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid(min: f64, max: f64, cells: usize) -> GridIndex {
        GridIndex::new(Domain::new(min, min, max, max).unwrap(), cells, cells).unwrap()
    }

    fn found_id(n: Nearest) -> u64 {
        n.found().expect("expected a node").id.0
    }

    #[test]
    fn test_rejects_zero_cells() {
        let domain = Domain::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(matches!(
            GridIndex::new(domain, 0, 10),
            Err(MatchError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_cell_assignment_and_clamping() {
        let g = grid(0.0, 10.0, 10);

        assert_eq!(g.cell_of(PlanarPoint::new(0.0, 0.0)), (0, 0));
        assert_eq!(g.cell_of(PlanarPoint::new(1.0, 2.0)), (1, 2)); // on a boundary
        assert_eq!(g.cell_of(PlanarPoint::new(9.999, 5.5)), (9, 5));
        assert_eq!(g.cell_of(PlanarPoint::new(10.0, 10.0)), (9, 9)); // outer edge
        assert_eq!(g.cell_of(PlanarPoint::new(-3.0, 42.0)), (0, 9));
    }

    #[test]
    fn test_every_node_lands_in_one_cell() {
        let mut g = grid(0.0, 10.0, 10);
        for (i, (x, y)) in [(0.0, 0.0), (10.0, 10.0), (5.0, 5.0), (3.0, 7.0)].iter().enumerate() {
            g.insert(&NetworkNode::new(i as u64, *x, *y));
        }

        let total: usize = g.buckets.iter().map(|b| b.len()).sum();
        assert_eq!(total, 4);
        assert_eq!(g.len(), 4);
        assert_eq!(g.cell_stats().occupied, 4);
        assert_eq!(g.cell_stats().max_bucket, 1);
    }

    #[test]
    fn test_empty_index() {
        let g = grid(0.0, 100.0, 20);
        for q in [(0.0, 0.0), (50.0, 50.0), (100.0, 100.0), (-5.0, 500.0)] {
            assert_eq!(g.nearest(q.into()), Nearest::Empty);
        }
    }

    #[test]
    fn test_three_nodes() {
        let mut g = grid(-1.0, 11.0, 1000);
        g.insert(&NetworkNode::new(1, 0.0, 0.0));
        g.insert(&NetworkNode::new(2, 10.0, 0.0));
        g.insert(&NetworkNode::new(3, 0.0, 10.0));

        let hit = g.nearest(PlanarPoint::new(1.0, 1.0)).found().unwrap();
        assert_eq!(hit.id, NodeId(1));
        assert!((hit.distance - 2f64.sqrt()).abs() < 1e-12);

        assert_eq!(found_id(g.nearest(PlanarPoint::new(9.0, 1.0))), 2);
        assert_eq!(found_id(g.nearest(PlanarPoint::new(1.0, 9.0))), 3);
    }

    #[test]
    fn test_ties_go_to_lowest_id() {
        let mut g = grid(0.0, 10.0, 10);
        g.insert(&NetworkNode::new(8, 6.0, 5.0));
        g.insert(&NetworkNode::new(3, 4.0, 5.0));
        g.insert(&NetworkNode::new(5, 5.0, 6.0));

        assert_eq!(found_id(g.nearest(PlanarPoint::new(5.0, 5.0))), 3);
    }

    #[test]
    fn test_far_ring_is_reached() {
        // Only node sits many empty rings away from the query's home cell
        let mut g = grid(0.0, 100.0, 100);
        g.insert(&NetworkNode::new(77, 95.5, 3.5));

        let hit = g.nearest(PlanarPoint::new(2.5, 2.5)).found().unwrap();
        assert_eq!(hit.id, NodeId(77));
        assert!((hit.distance - (93.0f64 * 93.0 + 1.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_closer_node_in_later_ring_wins() {
        // A node in the home cell is found first, but a node just across the
        // cell edge (ring 1) is closer and must replace it
        let mut g = grid(0.0, 10.0, 10);
        g.insert(&NetworkNode::new(1, 5.0, 5.5));
        g.insert(&NetworkNode::new(2, 6.01, 5.5));

        assert_eq!(found_id(g.nearest(PlanarPoint::new(5.99, 5.5))), 2);

        // Home cell holds a node at ~1.34, ring 2 holds one at 1.21; stopping
        // at the first non-empty ring would return the wrong node
        let mut g = grid(0.0, 10.0, 10);
        g.insert(&NetworkNode::new(1, 5.0, 5.0));
        g.insert(&NetworkNode::new(2, 7.2, 5.9));
        assert_eq!(found_id(g.nearest(PlanarPoint::new(5.99, 5.9))), 2);
    }

    #[test]
    fn test_boundary_points() {
        let mut g = grid(0.0, 10.0, 10);
        g.insert(&NetworkNode::new(1, 0.0, 0.0)); // corner
        g.insert(&NetworkNode::new(2, 10.0, 10.0)); // opposite corner
        g.insert(&NetworkNode::new(3, 3.0, 4.0)); // exact cell corner

        assert_eq!(found_id(g.nearest(PlanarPoint::new(0.0, 0.0))), 1);
        assert_eq!(found_id(g.nearest(PlanarPoint::new(10.0, 10.0))), 2);
        assert_eq!(found_id(g.nearest(PlanarPoint::new(3.0, 4.0))), 3);
        assert_eq!(found_id(g.nearest(PlanarPoint::new(2.999, 3.999))), 3);
    }

    #[test]
    fn test_query_outside_domain() {
        let mut g = grid(0.0, 10.0, 10);
        g.insert(&NetworkNode::new(1, 1.0, 1.0));
        g.insert(&NetworkNode::new(2, 9.0, 9.0));

        assert_eq!(found_id(g.nearest(PlanarPoint::new(50.0, 50.0))), 2);
        assert_eq!(found_id(g.nearest(PlanarPoint::new(-50.0, 0.0))), 1);
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5709);

        // (node count, domain size, cells per axis)
        let cases = [
            (1, 10.0, 4),
            (10, 1_000.0, 50),
            (200, 50.0, 10),
            (500, 100_000.0, 1000),
            (2_000, 5_000.0, 64),
            (50, 1_000.0, 1),
        ];

        for (count, size, cells) in cases {
            let nodes: Vec<NetworkNode> = (0..count)
                .map(|i| {
                    NetworkNode::new(
                        i as u64,
                        rng.random_range(0.0..size),
                        rng.random_range(0.0..size),
                    )
                })
                .collect();

            let domain = Domain::enclosing(nodes.iter().map(|n| n.planar), 1.0).unwrap();
            let mut g = GridIndex::new(domain, cells, cells).unwrap();
            for n in &nodes {
                g.insert(n);
            }

            for _ in 0..200 {
                let q = PlanarPoint::new(
                    rng.random_range(domain.min_x()..domain.max_x()),
                    rng.random_range(domain.min_y()..domain.max_y()),
                );
                let expected = nearest_by_scan(&nodes, q).unwrap();
                let actual = g.nearest(q).found().unwrap();
                assert_eq!(actual.id, expected.id, "query {:?} with {} nodes", q, count);
                assert_eq!(actual.distance, expected.distance);
            }
        }
    }

    #[test]
    fn test_clustered_nodes_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);

        // Two dense clusters far apart leave most rings empty
        let mut nodes = Vec::new();
        for i in 0..300u64 {
            let (cx, cy) = if i % 2 == 0 { (100.0, 100.0) } else { (9_900.0, 9_000.0) };
            nodes.push(NetworkNode::new(
                i,
                cx + rng.random_range(-5.0..5.0),
                cy + rng.random_range(-5.0..5.0),
            ));
        }

        let domain = Domain::new(0.0, 0.0, 10_000.0, 10_000.0).unwrap();
        let mut g = GridIndex::new(domain, 200, 200).unwrap();
        for n in &nodes {
            g.insert(n);
        }

        for _ in 0..100 {
            let q = PlanarPoint::new(
                rng.random_range(0.0..10_000.0),
                rng.random_range(0.0..10_000.0),
            );
            assert_eq!(
                g.nearest(q).found().map(|c| c.id),
                nearest_by_scan(&nodes, q).map(|c| c.id)
            );
        }
    }
}
