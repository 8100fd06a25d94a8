//! The one HTTP client shared by every fetcher.
//!
//! [`HttpFetcher`] implements the feed, page and thumbnail collaborator
//! traits. Requests are made one at a time and each call carries its own
//! timeout; nothing is retried.

use crate::error::{BeatError, Result};
use std::time::Duration;
use tracing::debug;

pub const FEED_TIMEOUT: Duration = Duration::from_secs(25);
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(25);
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|source| BeatError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }

    /// Shared client for callers that need to build their own requests.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET `url` and return the body bytes; non-2xx statuses are errors.
    pub async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let http_err = |source| BeatError::Http {
            url: url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(http_err)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BeatError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(http_err)?;
        debug!(%url, bytes = body.len(), "Fetched");
        Ok(body.to_vec())
    }

    /// GET `url` and decode the body as (lossy) UTF-8.
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let body = self.get_bytes(url, timeout).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
