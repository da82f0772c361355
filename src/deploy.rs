//! Deploy info lookup from the deployment gist

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::GistConfig;

const USER_AGENT: &str = concat!("mosaic-readme/", env!("CARGO_PKG_VERSION"));

/// Latest deployment of the mosaic tile contract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeployInfo {
    pub timestamp: String,
    pub mosaic_tile_address: String,
}

/// Body of `GET /gists/{id}`, reduced to what we read
#[derive(Debug, Default, Deserialize)]
pub struct Gist {
    #[serde(default)]
    pub files: Option<HashMap<String, GistFile>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub content: Option<String>,
}

/// Deploy record stored as JSON text inside the gist file
#[derive(Debug, Default, Deserialize)]
struct DeployRecord {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    job: Option<DeployJob>,
}

#[derive(Debug, Default, Deserialize)]
struct DeployJob {
    #[serde(default)]
    data: Option<DeployData>,
}

#[derive(Debug, Default, Deserialize)]
struct DeployData {
    #[serde(default)]
    mosaic_tile_address: Option<String>,
}

impl From<DeployRecord> for DeployInfo {
    fn from(record: DeployRecord) -> Self {
        let mosaic_tile_address = record
            .job
            .and_then(|job| job.data)
            .and_then(|data| data.mosaic_tile_address)
            .unwrap_or_default();

        Self {
            timestamp: record.timestamp.unwrap_or_default(),
            mosaic_tile_address,
        }
    }
}

/// Outcome of looking for the deploy file in a gist
#[derive(Debug)]
pub enum DeployLookup {
    /// File present and its content parsed
    Found(DeployInfo),
    /// No file with that exact name
    Missing,
    /// File present but its content is not a deploy record
    Unparseable(serde_json::Error),
}

impl DeployLookup {
    /// Collapse the lookup into a value; anything but `Found` is the zero value
    pub fn into_info(self) -> DeployInfo {
        match self {
            DeployLookup::Found(info) => info,
            DeployLookup::Missing => {
                tracing::info!("no deploy file in gist, leaving deploy info empty");
                DeployInfo::default()
            }
            DeployLookup::Unparseable(e) => {
                tracing::warn!(error = %e, "failed to parse deploy file, leaving deploy info empty");
                DeployInfo::default()
            }
        }
    }
}

/// Find `file_name` among the gist files and parse its content
pub fn find_deploy(files: &HashMap<String, GistFile>, file_name: &str) -> DeployLookup {
    let Some(file) = files.get(file_name) else {
        return DeployLookup::Missing;
    };

    let content = file.content.as_deref().unwrap_or_default();
    match serde_json::from_str::<DeployRecord>(content) {
        Ok(record) => DeployLookup::Found(record.into()),
        Err(e) => DeployLookup::Unparseable(e),
    }
}

/// Decode a gist response body and extract the deploy info.
///
/// Only a malformed top-level document is an error.
pub fn parse_gist(body: &str, file_name: &str) -> Result<DeployInfo> {
    let gist: Gist = serde_json::from_str(body).context("Failed to decode gist response")?;
    let files = gist.files.unwrap_or_default();
    tracing::debug!(files = ?files.keys().collect::<Vec<_>>(), "gist files");

    Ok(find_deploy(&files, file_name).into_info())
}

/// Fetch the gist and return the deploy info it holds
pub async fn fetch_latest(config: &GistConfig) -> Result<DeployInfo> {
    let url = format!(
        "{}/gists/{}",
        config.api_url.trim_end_matches('/'),
        config.gist_id
    );
    tracing::info!(%url, "fetching deploy info");

    let client = reqwest::Client::new();
    let response = client
        .get(&url)
        .header("Authorization", format!("token {}", config.token))
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github.v3+json")
        .send()
        .await
        .context("Failed to fetch gist")?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        tracing::warn!(gist_id = %config.gist_id, "gist not found, leaving deploy info empty");
        return Ok(DeployInfo::default());
    }
    if !status.is_success() {
        bail!("Failed to fetch gist: HTTP {}", status);
    }

    let body = response.text().await.context("Failed to read gist response")?;
    parse_gist(&body, &config.deploy_file)
}
