//! Zonejoin - spatial join of point datasets against labelled zone polygons
//!
//! This library provides the zone index, the batch join and the dataset
//! loaders used by the `zonejoin` binary.

pub mod error;
pub mod models;
pub mod pip;
pub mod source;

pub use error::JoinError;
pub use models::{JoinSummary, QueryPoint, ZoneCount};
pub use pip::{JoinService, RawZone, Zone, ZoneSpatialIndex};
