//! Spatial join pipeline.
//!
//! Loads zone boundaries and a point dataset, assigns every point to the
//! first zone containing it and logs the per-zone counts.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use zonejoin::pip::{count_by_zone, JoinService, ZoneSpatialIndex};
use zonejoin::source::{
    extract_points, parse_rows, parse_zones, DataSource, DatasetFetcher, SoqlParams,
};

use crate::config::Config;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "zonejoin")]
#[command(about = "Count points of a dataset per zone polygon")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Zone boundary GeoJSON (URL or path), overrides config
    #[arg(long)]
    boundaries: Option<String>,

    /// Feature property holding the zone label, overrides config
    #[arg(long)]
    label_key: Option<String>,

    /// Point dataset JSON (URL or path), overrides config
    #[arg(long)]
    points: Option<String>,

    /// Socrata `$limit` for the point request, overrides config
    #[arg(long)]
    limit: Option<u64>,

    /// Socrata `$where` filter for the point request, overrides config
    #[arg(long = "where")]
    filter: Option<String>,

    /// Number of zones to list in the summary (0 lists all)
    #[arg(long, default_value = "20")]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args);

    info!("Zonejoin");
    info!("Boundaries: {}", config.boundaries.source);
    info!("Points: {}", config.points.source);

    let fetcher = DatasetFetcher::new()?;

    // Zone boundaries
    let boundary_source = DataSource::parse(&config.boundaries.source);
    let text = fetcher
        .load_text(&boundary_source, &SoqlParams::default())
        .await
        .context("Failed to load zone boundaries")?;
    let raw_zones = parse_zones(&text, &config.boundaries.label_key)?;
    info!("Loaded {} zone records", raw_zones.len());

    let (index, exclusions) = ZoneSpatialIndex::build(raw_zones);
    for exclusion in &exclusions {
        warn!("Skipping zone record {}: {}", exclusion.index, exclusion.error);
    }
    let service = JoinService::new(index);
    info!("Join service ready with {} zones", service.index().len());

    // Points
    let point_source = DataSource::parse(&config.points.source);
    let params = SoqlParams {
        limit: config.points.limit,
        filter: config.points.filter.clone(),
    };
    let text = fetcher
        .load_text(&point_source, &params)
        .await
        .context("Failed to load point dataset")?;
    let rows = parse_rows(&text)?;
    let points = extract_points(&rows, &config.points.column);
    info!("Loaded {} points", points.len());

    let (results, summary) = service.join(&points);
    let counts = count_by_zone(&results);

    info!(
        "{} of {} points matched {} zones ({} zone records excluded)",
        summary.matched,
        summary.total,
        counts.len(),
        exclusions.len()
    );

    let shown = if args.top == 0 { counts.len() } else { args.top };
    for zone in counts.iter().take(shown) {
        info!("  {:<12} {:>8}", zone.label, zone.count);
    }
    if counts.len() > shown {
        info!("  ... {} more zones", counts.len() - shown);
    }

    if summary.unmatched() > 0 {
        warn!(
            "{} points unmatched ({} outside all zones, {} invalid coordinates)",
            summary.unmatched(),
            summary.outside,
            summary.invalid
        );
    }

    Ok(())
}

/// Command line flags take precedence over the config file
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(source) = &args.boundaries {
        config.boundaries.source = source.clone();
    }
    if let Some(key) = &args.label_key {
        config.boundaries.label_key = key.clone();
    }
    if let Some(source) = &args.points {
        config.points.source = source.clone();
    }
    if args.limit.is_some() {
        config.points.limit = args.limit;
    }
    if args.filter.is_some() {
        config.points.filter = args.filter.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "zonejoin",
            "--points",
            "trees.json",
            "--label-key",
            "zipcode",
            "--where",
            "species is not null",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.points.source, "trees.json");
        assert_eq!(config.boundaries.label_key, "zipcode");
        assert_eq!(config.points.filter.as_deref(), Some("species is not null"));
        assert_eq!(config.points.limit, Some(2_000_000));
        assert_eq!(config.boundaries.source, config::SF_ZIP_BOUNDARIES);
    }
}
