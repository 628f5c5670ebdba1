//! Query points.

use serde::{Deserialize, Serialize};

use crate::error::JoinError;

/// A point to resolve against the zone index (x = lon, y = lat).
///
/// Values that could not be parsed upstream are carried as NaN so the
/// point keeps its place in the batch and resolves to no match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub x: f64,
    pub y: f64,
}

impl QueryPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Placeholder for a row with no usable coordinates
    pub fn missing() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    /// Check the point is finite and inside lon/lat range
    pub fn validate(&self) -> Result<(), JoinError> {
        let in_range = self.x.is_finite()
            && self.y.is_finite()
            && (-180.0..=180.0).contains(&self.x)
            && (-90.0..=90.0).contains(&self.y);

        if in_range {
            Ok(())
        } else {
            Err(JoinError::InvalidCoordinate {
                x: self.x,
                y: self.y,
            })
        }
    }
}

impl From<(f64, f64)> for QueryPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
