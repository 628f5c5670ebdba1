//! Point-in-Polygon (PIP) zone join.
//!
//! Validates labelled zone polygons, indexes their bounding boxes in an
//! R-tree and assigns each query point to the first zone containing it.

mod geometry;
mod index;
mod service;
mod zone;

pub use geometry::to_multi_polygon;
pub use index::{Exclusion, IndexedZone, ZoneSpatialIndex};
pub use service::{count_by_zone, JoinResult, JoinService};
pub use zone::{RawZone, Zone, DEGENERATE_EPSILON};
