//! Zone boundary loading from GeoJSON.

use anyhow::{bail, Context, Result};
use geojson::GeoJson;

use crate::pip::RawZone;

/// Parse a GeoJSON document into raw zone records, labelled from the
/// `label_key` property of each feature.
pub fn parse_zones(text: &str, label_key: &str) -> Result<Vec<RawZone>> {
    let geojson: GeoJson = text.parse().context("Failed to parse boundary GeoJSON")?;

    let zones = match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .map(|feature| RawZone::from_feature(feature, label_key))
            .collect(),
        GeoJson::Feature(feature) => vec![RawZone::from_feature(feature, label_key)],
        GeoJson::Geometry(_) => bail!("Boundary GeoJSON must contain features with properties"),
    };

    Ok(zones)
}
