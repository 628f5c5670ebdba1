//! Dataset loader for open data portals (Socrata JSON / GeoJSON exports).

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Where a dataset lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(String),
    File(PathBuf),
}

impl DataSource {
    /// `http(s)://` locations are fetched, anything else is a local path
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Http(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Http(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Socrata query parameters for a single request
#[derive(Debug, Clone, Default)]
pub struct SoqlParams {
    /// `$limit`
    pub limit: Option<u64>,
    /// `$where`
    pub filter: Option<String>,
}

impl SoqlParams {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![];
        if let Some(limit) = self.limit {
            query.push(("$limit", limit.to_string()));
            query.push(("$offset", "0".to_string()));
        }
        if let Some(filter) = &self.filter {
            query.push(("$where", filter.clone()));
        }
        query
    }
}

/// Fetches raw dataset bodies over HTTP or from disk
pub struct DatasetFetcher {
    client: Client,
}

impl DatasetFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("zonejoin/0.1")
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Load the body of a dataset as text.
    ///
    /// `params` only apply to HTTP sources.
    pub async fn load_text(&self, source: &DataSource, params: &SoqlParams) -> Result<String> {
        match source {
            DataSource::Http(url) => {
                let url = reqwest::Url::parse_with_params(url, params.to_query())
                    .with_context(|| format!("Invalid dataset URL {}", url))?;
                info!("Fetching {}", url);
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Request to {} failed", url))?
                    .error_for_status()
                    .with_context(|| format!("Request to {} returned an error status", url))?;

                let body = response.text().await?;
                debug!("Fetched {} bytes from {}", body.len(), url);
                Ok(body)
            }
            DataSource::File(path) => {
                info!("Reading {}", path.display());
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))
            }
        }
    }
}
