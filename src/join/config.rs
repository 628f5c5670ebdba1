use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use zonejoin::source::PointColumn;

pub const SF_ZIP_BOUNDARIES: &str =
    "https://data.sfgov.org/api/geospatial/uq3t-6t53?method=export&format=GeoJSON";
pub const SF_STREET_TREES: &str = "https://data.sfgov.org/resource/tkzw-k3nq.json";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub boundaries: BoundaryConfig,
    #[serde(default)]
    pub points: PointConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryConfig {
    pub source: String,
    pub label_key: String,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            source: SF_ZIP_BOUNDARIES.to_string(),
            label_key: "zip".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PointConfig {
    pub source: String,
    pub column: PointColumn,
    pub limit: Option<u64>,
    #[serde(rename = "where")]
    pub filter: Option<String>,
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            source: SF_STREET_TREES.to_string(),
            column: PointColumn::default(),
            limit: Some(2_000_000),
            filter: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
