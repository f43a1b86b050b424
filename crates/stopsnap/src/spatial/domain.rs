//! Rectangular extent covered by a spatial index.

use geo::{BoundingRect, Coord, MultiPoint, Point, Rect};

use crate::models::types::*;

/// Bounding rectangle in planar coordinates with strictly positive area
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    rect: Rect,
}

impl Domain {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            return Err(MatchError::InvalidDomain(format!(
                "non-finite bounds ({}, {}) - ({}, {})",
                min_x, min_y, max_x, max_y
            )));
        }
        if max_x <= min_x || max_y <= min_y {
            return Err(MatchError::InvalidDomain(format!(
                "degenerate bounds ({}, {}) - ({}, {})",
                min_x, min_y, max_x, max_y
            )));
        }

        Ok(Self {
            rect: Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y }),
        })
    }

    /// Union bounding box of `points`, grown by `margin` on every side
    pub fn enclosing<I>(points: I, margin: f64) -> Result<Self>
    where
        I: IntoIterator<Item = PlanarPoint>,
    {
        let mut cloud = Vec::new();
        for p in points {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(MatchError::InvalidDomain(format!(
                    "point ({}, {}) is not finite",
                    p.x, p.y
                )));
            }
            cloud.push(Point::from(Coord::from(p)));
        }

        let bounds = MultiPoint::new(cloud)
            .bounding_rect()
            .ok_or_else(|| MatchError::InvalidDomain("no points to bound".into()))?;

        Self::new(
            bounds.min().x - margin,
            bounds.min().y - margin,
            bounds.max().x + margin,
            bounds.max().y + margin,
        )
    }

    pub fn min_x(&self) -> f64 {
        self.rect.min().x
    }

    pub fn min_y(&self) -> f64 {
        self.rect.min().y
    }

    pub fn max_x(&self) -> f64 {
        self.rect.max().x
    }

    pub fn max_y(&self) -> f64 {
        self.rect.max().y
    }

    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    pub fn height(&self) -> f64 {
        self.rect.height()
    }
}
