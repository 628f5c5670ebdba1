//! Labelled zone polygons and the raw records they are built from.

use geo::{BoundingRect, MultiPolygon};
use geojson::Feature;

use super::geometry::to_multi_polygon;
use crate::error::JoinError;

/// Padding applied to a bounding box axis with zero extent
pub const DEGENERATE_EPSILON: f64 = 1e-7;

/// Zone record as handed over by the loading side, not yet validated
#[derive(Debug, Clone, Default)]
pub struct RawZone {
    pub label: Option<String>,
    pub geometry: Option<geojson::Geometry>,
}

impl RawZone {
    pub fn new(label: impl Into<String>, geometry: geojson::Geometry) -> Self {
        Self {
            label: Some(label.into()),
            geometry: Some(geometry),
        }
    }

    /// Take the label from `properties[label_key]`.
    ///
    /// Numeric labels (e.g. ZIP codes stored as numbers) are stringified.
    pub fn from_feature(feature: Feature, label_key: &str) -> Self {
        let label = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(label_key))
            .and_then(|value| match value {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        Self {
            label,
            geometry: feature.geometry,
        }
    }
}

/// A single validated zone polygon with its label
#[derive(Debug, Clone)]
pub struct Zone {
    /// Position in construction order
    pub id: usize,
    pub label: String,
    pub geometry: MultiPolygon<f64>,
}

impl Zone {
    /// Validate a raw record into a zone.
    pub fn from_raw(id: usize, raw: RawZone) -> Result<Self, JoinError> {
        let geometry = raw
            .geometry
            .ok_or_else(|| JoinError::malformed("missing geometry"))?;
        let geometry = to_multi_polygon(&geometry.value)?;
        let label = raw.label.ok_or(JoinError::MissingLabel)?;

        Ok(Self {
            id,
            label,
            geometry,
        })
    }

    /// Bounding box as `(min_x, min_y, max_x, max_y)`, padded so that
    /// both axes have positive extent.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let rect = self.geometry.bounding_rect()?;
        let (min_x, min_y) = (rect.min().x, rect.min().y);
        let (mut max_x, mut max_y) = (rect.max().x, rect.max().y);

        if min_x == max_x {
            max_x = min_x + DEGENERATE_EPSILON;
        }
        if min_y == max_y {
            max_y = min_y + DEGENERATE_EPSILON;
        }

        Some((min_x, min_y, max_x, max_y))
    }
}
