//! In-memory network node model.

pub mod table;

pub use table::NodeTable;
