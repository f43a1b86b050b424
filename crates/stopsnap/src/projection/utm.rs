//! WGS84 geographic to UTM projection.
//!
//! The transform is built from the zone as a PROJ string
//! (`+proj=utm +zone=17 +datum=WGS84`) and evaluated by `proj4rs`, which
//! implements the extended transverse Mercator in pure Rust.

use std::fmt;

use log::debug;
use proj4rs::Proj;

use crate::models::traits::Projector;
use crate::models::types::*;
use crate::projection::zone::{Hemisphere, UtmZone};

const WGS84_LONGLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Projects WGS84 lon/lat into one UTM zone
pub struct UtmProjector {
    zone: UtmZone,
    source: Proj,
    target: Proj,
}

impl UtmProjector {
    pub fn new(zone: UtmZone) -> Result<Self> {
        let definition = proj_definition(zone);
        let build = |definition: &str| {
            Proj::from_proj_string(definition).map_err(|e| {
                MatchError::Configuration(format!("cannot build projection {:?}: {}", definition, e))
            })
        };

        Ok(Self {
            zone,
            source: build(WGS84_LONGLAT)?,
            target: build(&definition)?,
        })
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// Project a single point; `None` if the input is outside ±180°/±90°,
    /// 90° or more of longitude away from the central meridian, or has no
    /// finite image
    pub fn forward(&self, point: GeoPoint) -> Option<PlanarPoint> {
        if !point.is_valid() {
            return None;
        }

        let mut dlon = point.lon - self.zone.central_meridian();
        if dlon > 180.0 {
            dlon -= 360.0;
        } else if dlon < -180.0 {
            dlon += 360.0;
        }
        if dlon.abs() >= 90.0 {
            return None;
        }

        let mut xyz = (point.lon.to_radians(), point.lat.to_radians(), 0.0);
        proj4rs::transform::transform(&self.source, &self.target, &mut xyz).ok()?;

        let (easting, northing) = (xyz.0, xyz.1);
        if easting.is_finite() && northing.is_finite() {
            Some(PlanarPoint::new(easting, northing))
        } else {
            None
        }
    }
}

impl fmt::Debug for UtmProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtmProjector")
            .field("zone", &self.zone)
            .field("definition", &proj_definition(self.zone))
            .finish()
    }
}

/// PROJ string for a UTM zone on WGS84
pub fn proj_definition(zone: UtmZone) -> String {
    let south = match zone.hemisphere() {
        Hemisphere::North => "",
        Hemisphere::South => " +south",
    };
    format!(
        "+proj=utm +zone={}{} +datum=WGS84 +units=m +no_defs",
        zone.number(),
        south
    )
}

impl Projector for UtmProjector {
    fn project(&self, points: &[GeoPoint]) -> Result<Vec<PlanarPoint>> {
        debug!("Projecting {} points into UTM {}", points.len(), self.zone);

        points
            .iter()
            .enumerate()
            .map(|(index, p)| {
                if !p.is_valid() {
                    return Err(MatchError::Projection {
                        index,
                        reason: format!("({}, {}) is outside the lon/lat domain", p.lon, p.lat),
                    });
                }
                self.forward(*p).ok_or_else(|| MatchError::Projection {
                    index,
                    reason: format!(
                        "({}, {}) has no finite image in UTM {}",
                        p.lon, p.lat, self.zone
                    ),
                })
            })
            .collect()
    }
}
