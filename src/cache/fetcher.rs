//! HTTP side of the cache
//!
//! `FileCache` only talks to the network through the `Fetcher` trait, so the
//! transport can be swapped out (a shared client, a test double).

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};

use super::FileCacheError;

/// Downloads a resource by URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue a GET and return the full body as bytes
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FileCacheError>;

    /// Issue a GET and return the body decoded as text
    async fn fetch_text(&self, url: &str) -> Result<String, FileCacheError>;
}

/// `Fetcher` backed by a `reqwest::Client`
///
/// Redirects and timeouts follow the client's defaults. Non-2xx responses are
/// errors unless `require_success_status(false)` is set.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    require_success_status: bool,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with a default client that rejects non-2xx responses
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a fetcher around an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            require_success_status: true,
        }
    }

    /// Choose whether non-2xx responses are errors
    pub fn require_success_status(mut self, require: bool) -> Self {
        self.require_success_status = require;
        self
    }

    /// Whether non-2xx responses are errors
    pub fn requires_success_status(&self) -> bool {
        self.require_success_status
    }

    async fn get(&self, url: &str) -> Result<Response, FileCacheError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if self.require_success_status && !status.is_success() {
            return Err(FileCacheError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FileCacheError> {
        let response = self.get(url).await?;
        Ok(response.bytes().await?)
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FileCacheError> {
        let response = self.get(url).await?;
        // Decodes using the charset from Content-Type, falling back to UTF-8
        Ok(response.text().await?)
    }
}
