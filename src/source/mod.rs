//! Upstream dataset loading: zone boundaries and point rows.

mod fetcher;
mod points;
mod zones;

pub use fetcher::{DataSource, DatasetFetcher, SoqlParams};
pub use points::{extract_points, parse_rows, PointColumn};
pub use zones::parse_zones;
