//! Conversion of raw GeoJSON geometry into precise zone polygons.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{PolygonType, Position, Value};

use crate::error::JoinError;

/// Convert a GeoJSON geometry value into a `MultiPolygon`.
///
/// Only `Polygon` and `MultiPolygon` are accepted. Rings are closed if
/// needed and must end up with at least four positions.
pub fn to_multi_polygon(value: &Value) -> Result<MultiPolygon<f64>, JoinError> {
    let polygons = match value {
        Value::Polygon(rings) => vec![to_polygon(rings)?],
        Value::MultiPolygon(parts) => {
            if parts.is_empty() {
                return Err(JoinError::malformed("empty multipolygon"));
            }
            parts
                .iter()
                .map(|rings| to_polygon(rings))
                .collect::<Result<Vec<_>, _>>()?
        }
        other => {
            return Err(JoinError::malformed(format!(
                "expected Polygon or MultiPolygon, got {}",
                value_kind(other)
            )))
        }
    };

    Ok(MultiPolygon::new(polygons))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn to_polygon(rings: &PolygonType) -> Result<Polygon<f64>, JoinError> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| JoinError::malformed("polygon has no rings"))?;

    let exterior = to_ring(exterior)?;
    let interiors = interiors
        .iter()
        .map(|ring| to_ring(ring))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, interiors))
}

fn to_ring(positions: &[Position]) -> Result<LineString<f64>, JoinError> {
    let mut ring = positions
        .iter()
        .map(to_coord)
        .collect::<Result<Vec<_>, _>>()?;

    if ring.len() < 3 {
        return Err(JoinError::malformed(format!(
            "ring has {} positions",
            ring.len()
        )));
    }

    // Close the ring if needed
    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }

    if ring.len() < 4 {
        return Err(JoinError::malformed("ring collapses to fewer than 4 positions"));
    }

    Ok(LineString::new(ring))
}

fn to_coord(position: &Position) -> Result<Coord<f64>, JoinError> {
    match position.as_slice() {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        [x, y, ..] => Err(JoinError::malformed(format!(
            "non-finite position ({}, {})",
            x, y
        ))),
        _ => Err(JoinError::malformed("position has fewer than 2 ordinates")),
    }
}
