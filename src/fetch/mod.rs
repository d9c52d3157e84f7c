// src/fetch/mod.rs

use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::ScrapeError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client sending a browser-like `User-Agent` on every request.
pub fn build_client(user_agent: &str) -> Result<Client, ScrapeError> {
    let mut headers = header::HeaderMap::new();
    let value = header::HeaderValue::from_str(user_agent)
        .map_err(|e| ScrapeError::InvalidConfig(format!("invalid user agent: {e}")))?;
    headers.insert(header::USER_AGENT, value);

    Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ScrapeError::InvalidConfig(format!("building HTTP client: {e}")))
}

/// GET `url` and return its body. Transport errors and non-success statuses
/// both surface as [`ScrapeError::SourceUnavailable`]; there is no retry.
#[instrument(level = "info", skip(client), fields(url = %url))]
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, ScrapeError> {
    let unavailable = |e: reqwest::Error| ScrapeError::SourceUnavailable {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let body = client
        .get(url.clone())
        .send()
        .await
        .map_err(unavailable)?
        .error_for_status()
        .map_err(unavailable)?
        .text()
        .await
        .map_err(unavailable)?;

    debug!(bytes = body.len(), "fetched page");
    Ok(body)
}
