//! Data model, error type and collaborator traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::{NodeSource, Projector, StopSource};
pub use types::{
    CorrespondenceRecord, GeoPoint, MatchError, MatchOutcome, NetworkNode, PlanarPoint, Result,
    Stop,
};
