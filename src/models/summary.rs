//! Batch join outcome types.

use geo::MultiPolygon;
use serde::Serialize;

/// Counts of how the points of a batch resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    pub total: usize,
    pub matched: usize,
    /// Valid points not inside any zone (including an empty index)
    pub outside: usize,
    /// Non-numeric or out-of-range points
    pub invalid: usize,
}

impl JoinSummary {
    pub fn unmatched(&self) -> usize {
        self.outside + self.invalid
    }
}

/// Number of points that landed in one zone
#[derive(Debug, Clone)]
pub struct ZoneCount {
    pub label: String,
    pub count: usize,
    pub geometry: MultiPolygon<f64>,
}
