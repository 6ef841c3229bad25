// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::{Catalog, CatalogConfig};

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CatalogConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Download and decode the institution catalog.
///
/// Any non-2xx answer is an error; the stored feed must not be touched
/// when the catalog is unavailable.
pub async fn fetch_catalog(client: &reqwest::Client, config: &CatalogConfig) -> Result<Catalog> {
    let url = config.listing_url();
    log::info!("Fetching catalog from {url}");

    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    log::debug!("Catalog response: {} bytes", body.len());

    Catalog::from_slice(&body)
}
