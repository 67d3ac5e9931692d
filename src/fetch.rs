//! Source fetching.
//!
//! [`SourceFetcher`] is the "fetch bytes" seam the loader pulls through.
//! [`DefaultFetcher`] handles `http(s)://` URIs with reqwest and reads
//! `file://` URIs or bare paths from disk.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};

use crate::config::LoaderConfig;
use crate::error::SourceError;

/// Fetches the raw body of one source.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Returns the body bytes, or why the source is unusable. A non-success
    /// HTTP status is an error here; JSON parsing happens in the loader.
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, SourceError>;
}

pub struct DefaultFetcher {
    client: reqwest::Client,
    bypass_cache: bool,
}

impl DefaultFetcher {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("card-search/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            bypass_cache: config.bypass_cache,
        })
    }

    async fn fetch_http(&self, uri: &str) -> Result<Vec<u8>, SourceError> {
        let mut request = self.client.get(uri);
        if self.bypass_cache {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Fetch(e.to_string()))?;
        Ok(body.to_vec())
    }
}

async fn fetch_file(path: &str) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| SourceError::Fetch(format!("{}: {}", path, e)))
}

#[async_trait]
impl SourceFetcher for DefaultFetcher {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, SourceError> {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            self.fetch_http(uri).await
        } else if let Some(path) = uri.strip_prefix("file://") {
            fetch_file(path).await
        } else if uri.contains("://") {
            Err(SourceError::Fetch(format!(
                "unsupported source scheme: {}",
                uri
            )))
        } else {
            fetch_file(uri).await
        }
    }
}
