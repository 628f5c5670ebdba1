//! Core data models for the spatial join.

pub mod point;
pub mod summary;

pub use point::QueryPoint;
pub use summary::{JoinSummary, ZoneCount};
