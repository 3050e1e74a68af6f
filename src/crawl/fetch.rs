//! URL fetching with configurable timeouts

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A fetched document; `final_url` is the post-redirect location
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status_code: u16,
    pub final_url: Url,
    pub body: String,
}

/// HTTP fetcher shared by all site tasks
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    referrer: String,
}

impl Fetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            referrer: config.referrer.clone(),
        })
    }

    /// Fetch a single URL.
    ///
    /// HTTP error statuses are not fetch failures; pages are stored with
    /// their status code. Only network, timeout, and malformed-URL
    /// conditions error.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed_url =
            Url::parse(url).map_err(|e| Error::Fetch(format!("Malformed URL {}: {}", url, e)))?;

        debug!("Fetching: {}", url);

        let response = self
            .client
            .get(parsed_url)
            .header(reqwest::header::REFERER, &self.referrer)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("{}: {}", url, e)))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().clone();

        let body = response
            .text()
            .await
            .map_err(|e| Error::Parse(format!("Unreadable body from {}: {}", url, e)))?;

        Ok(FetchedPage {
            status_code,
            final_url,
            body,
        })
    }
}
