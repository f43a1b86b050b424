//! Geographic to planar projection.

pub mod utm;
pub mod zone;

pub use utm::UtmProjector;
pub use zone::{Hemisphere, UtmZone};
