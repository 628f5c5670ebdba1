//! Spatial index for fast zone lookups.

use geo::{Intersects, Point};
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{debug, info};

use super::{RawZone, Zone};
use crate::error::JoinError;
use crate::models::QueryPoint;

/// Wrapper for R-tree indexing of zones
#[derive(Clone)]
pub struct IndexedZone {
    pub zone: Arc<Zone>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedZone {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedZone {
    pub fn new(zone: Zone) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = zone.bbox()?;
        Some(Self {
            zone: Arc::new(zone),
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// A raw record that did not make it into the index
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    /// Position of the record in the construction input
    pub index: usize,
    pub error: JoinError,
}

/// Spatial index for zones using R-tree
pub struct ZoneSpatialIndex {
    tree: RTree<IndexedZone>,
    /// Zones in construction order, for linear lookups
    zones: Vec<Arc<Zone>>,
}

impl ZoneSpatialIndex {
    /// Build the index from raw zone records.
    ///
    /// Records that fail validation are left out and returned as
    /// exclusions; the rest keep their input position as id.
    pub fn build<I>(records: I) -> (Self, Vec<Exclusion>)
    where
        I: IntoIterator<Item = RawZone>,
    {
        let mut indexed = Vec::new();
        let mut exclusions = Vec::new();

        for (index, raw) in records.into_iter().enumerate() {
            let result = Zone::from_raw(index, raw).and_then(|zone| {
                IndexedZone::new(zone).ok_or_else(|| JoinError::malformed("empty bounding box"))
            });

            match result {
                Ok(iz) => indexed.push(iz),
                Err(error) => {
                    debug!("Skipping zone record {}: {}", index, error);
                    exclusions.push(Exclusion { index, error });
                }
            }
        }

        info!(
            "Building spatial index for {} zones ({} excluded)...",
            indexed.len(),
            exclusions.len()
        );

        let zones = indexed.iter().map(|iz| Arc::clone(&iz.zone)).collect();
        let tree = RTree::bulk_load(indexed);

        info!("Spatial index built with {} entries", tree.size());

        (Self { tree, zones }, exclusions)
    }

    /// Zones whose bounding box contains the point, in no particular order
    pub fn candidates(&self, x: f64, y: f64) -> impl Iterator<Item = &Arc<Zone>> {
        let query_envelope = AABB::from_point([x, y]);
        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .map(|iz| &iz.zone)
    }

    /// Find the first zone (in construction order) containing a point.
    ///
    /// Points on a zone boundary count as contained.
    pub fn lookup(&self, x: f64, y: f64) -> Option<Arc<Zone>> {
        let point = Point::new(x, y);

        // Use R-tree to get candidates via envelope intersection, then filter with exact containment
        self.candidates(x, y)
            .filter(|zone| zone.geometry.intersects(&point))
            .min_by_key(|zone| zone.id)
            .map(Arc::clone)
    }

    /// Like [`lookup`](Self::lookup), but says why a point has no zone.
    pub fn classify(&self, point: &QueryPoint) -> Result<Option<Arc<Zone>>, JoinError> {
        point.validate()?;
        if self.is_empty() {
            return Err(JoinError::EmptyIndex);
        }
        Ok(self.lookup(point.x, point.y))
    }

    /// Resolve a point, treating every failure as no match.
    pub fn query(&self, point: &QueryPoint) -> Option<Arc<Zone>> {
        self.classify(point).ok().flatten()
    }

    /// Scan every zone in construction order without the R-tree.
    pub fn lookup_linear(&self, x: f64, y: f64) -> Option<Arc<Zone>> {
        let point = Point::new(x, y);
        self.zones
            .iter()
            .find(|zone| zone.geometry.intersects(&point))
            .map(Arc::clone)
    }

    /// Get total number of indexed zones
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Geometry, Value};

    fn polygon(coords: &[(f64, f64)]) -> Geometry {
        Geometry::new(Value::Polygon(vec![coords
            .iter()
            .map(|(x, y)| vec![*x, *y])
            .collect()]))
    }

    fn square(label: &str, x0: f64, y0: f64, size: f64) -> RawZone {
        RawZone::new(
            label,
            polygon(&[
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
                (x0, y0),
            ]),
        )
    }

    fn label(zone: Option<Arc<Zone>>) -> Option<String> {
        zone.map(|z| z.label.clone())
    }

    #[test]
    fn test_unit_square_scenario() {
        let (index, exclusions) = ZoneSpatialIndex::build(vec![square("94110", 0.0, 0.0, 1.0)]);
        assert!(exclusions.is_empty());

        assert_eq!(label(index.lookup(0.5, 0.5)).as_deref(), Some("94110"));
        assert_eq!(label(index.lookup(2.0, 2.0)), None);
        // Corner is on the boundary
        assert_eq!(label(index.lookup(0.0, 0.0)).as_deref(), Some("94110"));
    }

    #[test]
    fn test_empty_index() {
        let (index, exclusions) = ZoneSpatialIndex::build(Vec::<RawZone>::new());
        assert!(index.is_empty());
        assert!(exclusions.is_empty());
        assert!(index.lookup(0.5, 0.5).is_none());
        assert_eq!(
            index.classify(&QueryPoint::new(0.5, 0.5)).unwrap_err(),
            JoinError::EmptyIndex
        );
        assert!(index.query(&QueryPoint::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn test_malformed_record_is_excluded() {
        let broken = RawZone::new(
            "broken",
            Geometry::new(Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])),
        );
        let (index, exclusions) =
            ZoneSpatialIndex::build(vec![broken, square("94110", 0.0, 0.0, 1.0)]);

        assert_eq!(exclusions.len(), 1);
        assert_eq!(exclusions[0].index, 0);
        assert!(matches!(exclusions[0].error, JoinError::MalformedGeometry(_)));
        assert_eq!(index.len(), 1);

        let zone = index.lookup(0.5, 0.5).unwrap();
        assert_eq!(zone.label, "94110");
        // Id keeps the input position
        assert_eq!(zone.id, 1);
    }

    #[test]
    fn test_interior_points_of_disjoint_zones() {
        let (index, _) = ZoneSpatialIndex::build(vec![
            square("a", 0.0, 0.0, 1.0),
            square("b", 5.0, 5.0, 1.0),
            square("c", -3.0, 2.0, 2.0),
        ]);

        assert_eq!(label(index.lookup(0.25, 0.75)).as_deref(), Some("a"));
        assert_eq!(label(index.lookup(5.5, 5.1)).as_deref(), Some("b"));
        assert_eq!(label(index.lookup(-2.0, 3.0)).as_deref(), Some("c"));
    }

    #[test]
    fn test_outside_all_boxes_has_no_candidates() {
        let (index, _) = ZoneSpatialIndex::build(vec![
            square("a", 0.0, 0.0, 1.0),
            square("b", 5.0, 5.0, 1.0),
        ]);

        assert_eq!(index.candidates(3.0, 3.0).count(), 0);
        assert!(index.lookup(3.0, 3.0).is_none());
    }

    #[test]
    fn test_box_hit_but_polygon_miss() {
        // Triangle whose box covers (0.9, 0.1) but the shape does not
        let triangle = RawZone::new(
            "tri",
            polygon(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (0.0, 0.0)]),
        );
        let (index, _) = ZoneSpatialIndex::build(vec![triangle]);

        assert_eq!(index.candidates(0.9, 0.1).count(), 1);
        assert!(index.lookup(0.9, 0.1).is_none());
    }

    #[test]
    fn test_shared_edge_goes_to_first_record() {
        let (index, _) = ZoneSpatialIndex::build(vec![
            square("left", 0.0, 0.0, 1.0),
            square("right", 1.0, 0.0, 1.0),
        ]);
        assert_eq!(label(index.lookup(1.0, 0.5)).as_deref(), Some("left"));

        let (index, _) = ZoneSpatialIndex::build(vec![
            square("right", 1.0, 0.0, 1.0),
            square("left", 0.0, 0.0, 1.0),
        ]);
        assert_eq!(label(index.lookup(1.0, 0.5)).as_deref(), Some("right"));
    }

    #[test]
    fn test_degenerate_zone_is_retrievable() {
        let flat = RawZone::new(
            "flat",
            polygon(&[(0.0, 5.0), (1.0, 5.0), (2.0, 5.0), (0.0, 5.0)]),
        );
        let (index, exclusions) = ZoneSpatialIndex::build(vec![flat]);
        assert!(exclusions.is_empty());

        assert_eq!(index.candidates(1.0, 5.0).count(), 1);
        assert_eq!(label(index.lookup(1.0, 5.0)).as_deref(), Some("flat"));
    }

    #[test]
    fn test_invalid_points_are_no_match() {
        let (index, _) = ZoneSpatialIndex::build(vec![square("94110", 0.0, 0.0, 1.0)]);

        for point in [
            QueryPoint::new(f64::NAN, 0.5),
            QueryPoint::new(0.5, f64::INFINITY),
            QueryPoint::new(200.0, 0.5),
            QueryPoint::new(0.5, -91.0),
        ] {
            assert!(index.query(&point).is_none());
            assert!(matches!(
                index.classify(&point),
                Err(JoinError::InvalidCoordinate { .. })
            ));
        }
    }

    #[test]
    fn test_lookup_matches_linear_scan() {
        let mut zones = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                // Overlapping squares so order matters
                let label = format!("{}-{}", i, j);
                zones.push(square(&label, i as f64 * 0.75, j as f64 * 0.75, 1.0));
            }
        }
        let (index, _) = ZoneSpatialIndex::build(zones);

        let mut x = -0.5;
        while x < 5.5 {
            let mut y = -0.5;
            while y < 5.5 {
                assert_eq!(
                    label(index.lookup(x, y)),
                    label(index.lookup_linear(x, y)),
                    "mismatch at ({}, {})",
                    x,
                    y
                );
                y += 0.125;
            }
            x += 0.125;
        }
    }
}
