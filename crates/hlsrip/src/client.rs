use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::DownloadConfig;
use crate::error::RipError;

/// Builds the shared HTTP client from the download configuration.
pub fn create_client(config: &DownloadConfig) -> Result<Client, RipError> {
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(config.headers.clone())
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()?;
    Ok(client)
}

/// Fetches a web page. A non-success status is not a fault here: the page
/// simply has no content for us, so `Ok(None)` is returned and the caller
/// moves on.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<Option<String>, RipError> {
    let response = client.get(url.clone()).send().await?;
    if !response.status().is_success() {
        warn!(%url, status = %response.status(), "page fetch returned non-success status");
        return Ok(None);
    }
    let body = response.text().await?;
    debug!(%url, bytes = body.len(), "page fetched");
    Ok(Some(body))
}

/// Fetches a playlist body. Unlike pages, a manifest URL that does not
/// answer with a success status is an error.
pub async fn fetch_manifest(client: &Client, url: &Url) -> Result<String, RipError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RipError::Status {
            status,
            url: url.clone(),
        });
    }
    let body = response.text().await?;
    debug!(%url, bytes = body.len(), "manifest fetched");
    Ok(body)
}

/// Derives the base URL of a playlist, i.e. its enclosing directory.
pub fn base_of(url: &Url) -> Result<Url, RipError> {
    url.join(".")
        .map_err(|e| RipError::InvalidUrl(format!("failed to determine base URL of {url}: {e}")))
}
