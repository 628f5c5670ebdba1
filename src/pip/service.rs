//! Batch join service: resolves a set of points against the zone index.

use hashbrown::HashMap;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Zone, ZoneSpatialIndex};
use crate::error::JoinError;
use crate::models::{JoinSummary, QueryPoint, ZoneCount};

/// Per-point outcome of a batch, aligned with the input points
pub type JoinResult = Option<Arc<Zone>>;

/// Point-in-polygon batch join service
pub struct JoinService {
    index: ZoneSpatialIndex,
}

impl JoinService {
    /// Create a new join service from a spatial index
    pub fn new(index: ZoneSpatialIndex) -> Self {
        Self { index }
    }

    /// Resolve every point, in input order.
    ///
    /// The index is only read, so points are resolved in parallel.
    pub fn batch_query(&self, points: &[QueryPoint]) -> Vec<JoinResult> {
        points
            .par_iter()
            .map(|point| self.index.query(point))
            .collect()
    }

    /// Resolve every point and tally how they resolved.
    pub fn join(&self, points: &[QueryPoint]) -> (Vec<JoinResult>, JoinSummary) {
        if self.index.is_empty() {
            warn!("Joining {} points against an empty index", points.len());
        }

        let outcomes: Vec<Result<JoinResult, JoinError>> = points
            .par_iter()
            .map(|point| self.index.classify(point))
            .collect();

        let mut summary = JoinSummary {
            total: points.len(),
            ..Default::default()
        };

        let results: Vec<JoinResult> = outcomes
            .into_iter()
            .map(|outcome| match outcome {
                Ok(Some(zone)) => {
                    summary.matched += 1;
                    Some(zone)
                }
                Ok(None) | Err(JoinError::EmptyIndex) => {
                    summary.outside += 1;
                    None
                }
                Err(e) => {
                    debug!("Point not joined: {}", e);
                    summary.invalid += 1;
                    None
                }
            })
            .collect();

        info!(
            "Joined {} points: {} matched, {} outside all zones, {} invalid",
            summary.total, summary.matched, summary.outside, summary.invalid
        );

        (results, summary)
    }

    /// Get the spatial index (for stats/debugging)
    pub fn index(&self) -> &ZoneSpatialIndex {
        &self.index
    }
}

/// Count matched points per zone label.
///
/// Sorted by descending count, then label. Zones sharing a label (e.g. a
/// ZIP split across records) are merged and keep the first geometry seen.
pub fn count_by_zone(results: &[JoinResult]) -> Vec<ZoneCount> {
    let mut counts: HashMap<&str, (usize, &Arc<Zone>)> = HashMap::new();

    for zone in results.iter().flatten() {
        counts
            .entry(zone.label.as_str())
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, zone));
    }

    let mut counts: Vec<ZoneCount> = counts
        .into_iter()
        .map(|(label, (count, zone))| ZoneCount {
            label: label.to_string(),
            count,
            geometry: zone.geometry.clone(),
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}
