//! Remote order exports.
//!
//! Fetches an export over HTTP(S) so it can go through the same ingest path
//! as files on disk.

use crate::ingest::LoadedInput;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info};

/// Fetch the body of an order export.
pub async fn fetch_export(url: &str, timeout_seconds: u64) -> Result<String> {
    info!("Fetching order export: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            anyhow::anyhow!("Request timed out after {}s", timeout_seconds)
        } else if e.is_connect() {
            anyhow::anyhow!("Cannot connect to {}", url)
        } else {
            anyhow::anyhow!("Failed to send request: {}", e)
        }
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("Export server error {}: {}", status, body));
    }

    let body = response
        .text()
        .await
        .context("Failed to read export body")?;
    debug!("Fetched {} bytes from {}", body.len(), url);

    Ok(body)
}

/// Fetch and parse a remote export. Transport failures are recorded on the input.
pub async fn load_remote(url: &str, timeout_seconds: u64) -> LoadedInput {
    match fetch_export(url, timeout_seconds).await {
        Ok(body) => LoadedInput::from_content(url.to_string(), &body),
        Err(e) => LoadedInput::failed(url.to_string(), e.to_string()),
    }
}
