//! Extraction of query points from JSON row datasets.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::models::QueryPoint;

/// How a row stores its location
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointColumn {
    /// Separate latitude / longitude fields, as numbers or numeric strings
    LatLon { lat: String, lon: String },
    /// A GeoJSON point object, e.g. `{"type": "Point", "coordinates": [lon, lat]}`
    GeoJson { field: String },
}

impl Default for PointColumn {
    fn default() -> Self {
        PointColumn::LatLon {
            lat: "latitude".to_string(),
            lon: "longitude".to_string(),
        }
    }
}

/// Parse a JSON array of row objects
pub fn parse_rows(text: &str) -> Result<Vec<Value>> {
    serde_json::from_str(text).context("Point dataset is not a JSON array of rows")
}

/// Pull one point per row. Rows without usable coordinates become
/// [`QueryPoint::missing`] so output stays aligned with the rows.
pub fn extract_points(rows: &[Value], column: &PointColumn) -> Vec<QueryPoint> {
    rows.iter()
        .map(|row| point_from_row(row, column).unwrap_or_else(QueryPoint::missing))
        .collect()
}

fn point_from_row(row: &Value, column: &PointColumn) -> Option<QueryPoint> {
    match column {
        PointColumn::LatLon { lat, lon } => {
            let x = to_number(row.get(lon)?)?;
            let y = to_number(row.get(lat)?)?;
            Some(QueryPoint::new(x, y))
        }
        PointColumn::GeoJson { field } => {
            let coords = row.get(field)?.get("coordinates")?.as_array()?;
            match coords.as_slice() {
                [x, y, ..] => Some(QueryPoint::new(to_number(x)?, to_number(y)?)),
                _ => None,
            }
        }
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
