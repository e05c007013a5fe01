//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client
//! - GET requests for list and detail pages
//! - Image downloads with browser-mimicking headers
//! - Error classification
//!
//! There is deliberately no retry here: a failed fetch is reported once and
//! the affected page is left as a gap (see the error-handling design).

use crate::config::HttpConfig;
use crate::AtlasError;
use reqwest::header::{ACCEPT, CACHE_CONTROL, REFERER};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Result of a page fetch
///
/// The crawler treats `HttpError` and `NetworkError` identically (a hard
/// logged failure that still counts toward phase completion); they are kept
/// apart so the log line can say which it was.
#[derive(Debug)]
pub enum FetchOutcome {
    /// 200 response with a body
    Success { body: String },

    /// Any non-200 status
    HttpError { status_code: u16 },

    /// Transport error (connection refused, timeout, etc.)
    NetworkError { error: String },
}

/// Builds the HTTP client shared by both crawl phases
///
/// The catalog site is plain http and the image CDN rejects requests without
/// a browser-like user agent, so the agent string comes from configuration.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the URL of a list page
///
/// The index URL already carries a query string (enforced by config
/// validation); page numbers are appended to it, page 1 included.
pub fn list_page_url(index_url: &str, page: u32) -> String {
    format!("{}&page={}", index_url, page)
}

/// Fetches one page and classifies the outcome
///
/// Any non-200 status is a failure; there is no redirect or content-type
/// special-casing because the catalog serves every page as `text/html 200`.
pub async fn fetch_page(client: &Client, url: &str) -> FetchOutcome {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if status != 200 {
                return FetchOutcome::HttpError {
                    status_code: status,
                };
            }

            match response.text().await {
                Ok(body) => FetchOutcome::Success { body },
                Err(e) => FetchOutcome::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            FetchOutcome::NetworkError { error }
        }
    }
}

/// Downloads an image to `dest`, creating parent directories as needed
///
/// The CDN checks the Referer header, so image requests carry the configured
/// referer in addition to the client-level user agent. The transfer either
/// fully completes or errors; partial files are not cleaned up here because
/// `tokio::fs::write` only creates the file once the body has arrived.
pub async fn download_image(
    client: &Client,
    url: &str,
    dest: &Path,
    http: &HttpConfig,
) -> Result<(), AtlasError> {
    let response = client
        .get(url)
        .header(
            ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        )
        .header(CACHE_CONTROL, "no-cache")
        .header(REFERER, http.image_referer.as_str())
        .send()
        .await
        .map_err(|source| AtlasError::Http {
            url: url.to_string(),
            source,
        })?;

    let response = response
        .error_for_status()
        .map_err(|source| AtlasError::Http {
            url: url.to_string(),
            source,
        })?;

    let bytes = response.bytes().await.map_err(|source| AtlasError::Http {
        url: url.to_string(),
        source,
    })?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &bytes).await?;

    Ok(())
}
