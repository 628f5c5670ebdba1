//! Error taxonomy for the spatial join.
//!
//! None of these are fatal to a batch: a malformed record is left out of
//! the index and a bad point simply resolves to no match.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JoinError {
    /// Zone geometry could not be turned into a valid polygon
    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),

    /// Zone record has no label to assign
    #[error("zone record has no label")]
    MissingLabel,

    /// Query point is non-numeric or outside lon/lat range
    #[error("invalid coordinate ({x}, {y})")]
    InvalidCoordinate { x: f64, y: f64 },

    /// Query issued against an index with no zones
    #[error("spatial index is empty")]
    EmptyIndex,
}

impl JoinError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        JoinError::MalformedGeometry(reason.into())
    }
}
