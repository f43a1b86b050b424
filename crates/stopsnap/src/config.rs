//! Matcher configuration.
//!
//! With the `serde` feature enabled the configuration deserializes from a
//! TOML/JSON document; every field has a default so partial files work:
//!
//! ```toml
//! margin = 1.0
//! index = "grid"
//!
//! [grid]
//! mode = "adaptive"
//! target_per_cell = 2.0
//! ```

use crate::models::types::{MatchError, Result};
use crate::spatial::Domain;

pub const DEFAULT_MARGIN: f64 = 1.0;
pub const DEFAULT_CELLS: usize = 1000;
pub const DEFAULT_TARGET_PER_CELL: f64 = 2.0;
pub const DEFAULT_MAX_CELLS_PER_AXIS: usize = 4096;

/// Which spatial index answers nearest queries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum IndexKind {
    #[default]
    Grid,
    RTree,
}

/// Grid resolution policy
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "mode", rename_all = "lowercase")
)]
pub enum GridResolution {
    /// Fixed cell counts regardless of input size
    Fixed {
        #[cfg_attr(feature = "serde", serde(default = "default_cells"))]
        cells_x: usize,
        #[cfg_attr(feature = "serde", serde(default = "default_cells"))]
        cells_y: usize,
    },
    /// Aim for `target_per_cell` nodes per cell on average, following the
    /// domain's aspect ratio
    Adaptive {
        #[cfg_attr(feature = "serde", serde(default = "default_target"))]
        target_per_cell: f64,
        #[cfg_attr(feature = "serde", serde(default = "default_max_cells"))]
        max_cells_per_axis: usize,
    },
}

impl Default for GridResolution {
    fn default() -> Self {
        Self::Fixed {
            cells_x: DEFAULT_CELLS,
            cells_y: DEFAULT_CELLS,
        }
    }
}

impl GridResolution {
    /// Cell counts for `node_count` nodes spread over `domain`
    pub fn cells_for(&self, node_count: usize, domain: &Domain) -> (usize, usize) {
        match *self {
            Self::Fixed { cells_x, cells_y } => (cells_x, cells_y),
            Self::Adaptive {
                target_per_cell,
                max_cells_per_axis,
            } => {
                let total = (node_count as f64 / target_per_cell).max(1.0);
                let aspect = domain.width() / domain.height();
                let axis = |v: f64| (v.ceil() as usize).clamp(1, max_cells_per_axis.max(1));
                (axis((total * aspect).sqrt()), axis((total / aspect).sqrt()))
            }
        }
    }
}

#[cfg(feature = "serde")]
fn default_cells() -> usize {
    DEFAULT_CELLS
}

#[cfg(feature = "serde")]
fn default_target() -> f64 {
    DEFAULT_TARGET_PER_CELL
}

#[cfg(feature = "serde")]
fn default_max_cells() -> usize {
    DEFAULT_MAX_CELLS_PER_AXIS
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct MatchConfig {
    /// Grown onto every side of the stops' and nodes' bounding box
    pub margin: f64,
    pub index: IndexKind,
    pub grid: GridResolution,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            index: IndexKind::default(),
            grid: GridResolution::default(),
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.margin.is_finite() && self.margin > 0.0) {
            return Err(MatchError::Configuration(format!(
                "margin must be positive, got {}",
                self.margin
            )));
        }

        match self.grid {
            GridResolution::Fixed { cells_x, cells_y } if cells_x == 0 || cells_y == 0 => {
                Err(MatchError::Configuration(format!(
                    "grid needs at least one cell per axis, got {} x {}",
                    cells_x, cells_y
                )))
            }
            GridResolution::Adaptive {
                target_per_cell, ..
            } if !(target_per_cell.is_finite() && target_per_cell > 0.0) => {
                Err(MatchError::Configuration(format!(
                    "target_per_cell must be positive, got {}",
                    target_per_cell
                )))
            }
            GridResolution::Adaptive {
                max_cells_per_axis: 0,
                ..
            } => Err(MatchError::Configuration(
                "max_cells_per_axis must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }
}
