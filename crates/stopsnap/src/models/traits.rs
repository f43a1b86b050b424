//! Seams between the matcher and its collaborators.
//!
//! Stops, network nodes and the projection are all injected; implementations
//! can be in-memory tables, file loaders or bindings to a host model.

use crate::identifiers::NodeId;
use crate::models::types::*;

// ============================================================================
// Sources
// ============================================================================

/// Anything that yields stop records in a stable order
pub trait StopSource {
    fn stops(&self) -> Result<Vec<Stop>>;
}

/// Read-only view of the network's nodes
pub trait NodeSource {
    /// Regular (non-centroid) nodes in ascending id order
    fn nodes(&self) -> Result<Vec<NetworkNode>>;

    /// Resolve a node reference; `None` if the node no longer exists
    fn node(&self, id: NodeId) -> Option<NetworkNode>;
}

impl StopSource for [Stop] {
    fn stops(&self) -> Result<Vec<Stop>> {
        Ok(self.to_vec())
    }
}

impl StopSource for Vec<Stop> {
    fn stops(&self) -> Result<Vec<Stop>> {
        Ok(self.clone())
    }
}

impl<T: StopSource + ?Sized> StopSource for &T {
    fn stops(&self) -> Result<Vec<Stop>> {
        (**self).stops()
    }
}

impl<T: NodeSource + ?Sized> NodeSource for &T {
    fn nodes(&self) -> Result<Vec<NetworkNode>> {
        (**self).nodes()
    }

    fn node(&self, id: NodeId) -> Option<NetworkNode> {
        (**self).node(id)
    }
}

// ============================================================================
// Projection
// ============================================================================

/// Batch conversion from geographic to planar coordinates
///
/// The output has the same length and order as the input. Implementations
/// must be pure: the same input always yields bit-identical output.
pub trait Projector: Send + Sync {
    fn project(&self, points: &[GeoPoint]) -> Result<Vec<PlanarPoint>>;

    fn project_one(&self, point: GeoPoint) -> Result<PlanarPoint> {
        let mut projected = self.project(&[point])?;
        projected
            .pop()
            .ok_or_else(|| MatchError::Projection {
                index: 0,
                reason: "projector returned no point".into(),
            })
    }
}
