//! Stop-to-node matching.
//!
//! The matcher projects every stop into the network's planar system, builds a
//! spatial index over the network's regular nodes inside a domain that covers
//! both point sets, and resolves each stop to its nearest node. Every stop
//! yields exactly one [`CorrespondenceRecord`], in input order; a stop that
//! cannot be matched carries a sentinel outcome rather than failing the run.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::config::{IndexKind, MatchConfig};
use crate::models::traits::*;
use crate::models::types::*;
use crate::spatial::{Domain, GridIndex, Nearest, NearestIndex, RTreeIndex};

/// Counts per outcome for one run
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MatchSummary {
    pub stops: usize,
    pub nodes: usize,
    pub matched: usize,
    pub index_empty: usize,
    pub null_reference: usize,
    /// Largest stop-to-node distance among matched stops
    pub max_distance: f64,
}

impl MatchSummary {
    pub fn unmatched(&self) -> usize {
        self.index_empty + self.null_reference
    }

    fn record(&mut self, outcome: &MatchOutcome) {
        match outcome {
            MatchOutcome::Matched { distance, .. } => {
                self.matched += 1;
                self.max_distance = self.max_distance.max(*distance);
            }
            MatchOutcome::IndexEmpty => self.index_empty += 1,
            MatchOutcome::NullReference(_) => self.null_reference += 1,
        }
    }
}

/// Records of a run, in stop order
#[derive(Clone, Debug)]
pub struct MatchReport {
    pub records: Vec<CorrespondenceRecord>,
    pub summary: MatchSummary,
    /// False when the run was cancelled; `records` then covers a prefix of the stops
    pub complete: bool,
}

pub struct Matcher<P> {
    projector: P,
    config: MatchConfig,
}

impl<P: Projector> Matcher<P> {
    pub fn new(projector: P, config: MatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { projector, config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match every stop to its nearest regular node
    pub fn run<S, N>(&self, stops: &S, nodes: &N) -> Result<MatchReport>
    where
        S: StopSource + ?Sized,
        N: NodeSource + ?Sized,
    {
        self.run_until(stops, nodes, &AtomicBool::new(false))
    }

    /// Like [`Matcher::run`], but checks `cancel` before each stop and returns
    /// the records built so far once it is set
    pub fn run_until<S, N>(&self, stops: &S, nodes: &N, cancel: &AtomicBool) -> Result<MatchReport>
    where
        S: StopSource + ?Sized,
        N: NodeSource + ?Sized,
    {
        let stops = stops.stops()?;
        let network: Vec<NetworkNode> = nodes
            .nodes()?
            .into_iter()
            .filter(|n| !n.is_centroid)
            .collect();

        let mut summary = MatchSummary {
            stops: stops.len(),
            nodes: network.len(),
            ..Default::default()
        };
        info!(
            "Matching {} stops against {} network nodes",
            stops.len(),
            network.len()
        );

        if stops.is_empty() {
            return Ok(MatchReport {
                records: Vec::new(),
                summary,
                complete: true,
            });
        }
        if network.is_empty() {
            warn!("Network has no regular nodes; every stop will be unmatched");
        }

        let geo: Vec<GeoPoint> = stops.iter().map(|s| s.geo).collect();
        let projected = self.projector.project(&geo)?;
        if projected.len() != stops.len() {
            return Err(MatchError::Projection {
                index: projected.len().min(stops.len()),
                reason: format!(
                    "projector returned {} points for {} stops",
                    projected.len(),
                    stops.len()
                ),
            });
        }

        let domain = Domain::enclosing(
            projected
                .iter()
                .copied()
                .chain(network.iter().map(|n| n.planar)),
            self.config.margin,
        )?;
        debug!(
            "Domain ({}, {}) - ({}, {})",
            domain.min_x(),
            domain.min_y(),
            domain.max_x(),
            domain.max_y()
        );

        let index = self.build_index(domain, &network)?;

        let mut records = Vec::with_capacity(stops.len());
        let mut complete = true;
        for (stop, point) in stops.iter().zip(projected) {
            if cancel.load(Ordering::Relaxed) {
                complete = false;
                warn!(
                    "Matching cancelled after {} of {} stops",
                    records.len(),
                    stops.len()
                );
                break;
            }

            let outcome = match index.nearest(point) {
                Nearest::Empty => MatchOutcome::IndexEmpty,
                Nearest::Found(candidate) => match nodes.node(candidate.id) {
                    Some(node) => MatchOutcome::Matched {
                        node,
                        distance: candidate.distance,
                    },
                    None => {
                        debug!(
                            "Stop {} matched node {} which no longer resolves",
                            stop.id, candidate.id
                        );
                        MatchOutcome::NullReference(candidate.id)
                    }
                },
            };

            summary.record(&outcome);
            records.push(CorrespondenceRecord {
                stop_id: stop.id.clone(),
                stop: point,
                outcome,
            });
        }

        if summary.unmatched() > 0 {
            warn!(
                "{} of {} stops unmatched ({} with no nodes indexed, {} with dangling node references)",
                summary.unmatched(),
                records.len(),
                summary.index_empty,
                summary.null_reference
            );
        }
        info!(
            "Matched {} stops, largest stop-to-node distance {:.1}",
            summary.matched, summary.max_distance
        );

        Ok(MatchReport {
            records,
            summary,
            complete,
        })
    }

    /// Build the configured index over `nodes`
    pub fn build_index(
        &self,
        domain: Domain,
        nodes: &[NetworkNode],
    ) -> Result<Box<dyn NearestIndex>> {
        match self.config.index {
            IndexKind::Grid => {
                let (cells_x, cells_y) = self.config.grid.cells_for(nodes.len(), &domain);
                let mut grid = GridIndex::new(domain, cells_x, cells_y)?;
                for node in nodes {
                    grid.insert(node);
                }

                let stats = grid.cell_stats();
                let (cells_x, cells_y) = grid.dimensions();
                let (cell_w, cell_h) = grid.cell_size();
                debug!(
                    "Grid {} x {} of {:.1} x {:.1} cells: {} of {} occupied, largest bucket {}",
                    cells_x, cells_y, cell_w, cell_h, stats.occupied, stats.cells, stats.max_bucket
                );
                Ok(Box::new(grid))
            }
            IndexKind::RTree => {
                let tree = RTreeIndex::bulk_load(nodes);
                debug!("R-tree over {} nodes", tree.len());
                Ok(Box::new(tree))
            }
        }
    }
}
