// src/services/fetcher.rs

//! Content fetcher.
//!
//! Downloads a watched page and digests it on the fly.

use futures::StreamExt;
use md5::{Digest, Md5};
use reqwest::Client;

use crate::error::Result;
use crate::models::{ContentDigest, FetchConfig};
use crate::utils::http::create_async_client;

/// Fetches pages and returns their MD5 digest.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Client,
}

impl ContentFetcher {
    /// Create a fetcher with the configured timeout and user agent.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    /// GET `url` and digest the body.
    ///
    /// The body is streamed into the hasher chunk by chunk. Transport errors,
    /// timeouts and non-success statuses all fail the fetch; no partial
    /// digest is ever returned.
    pub async fn fetch(&self, url: &str) -> Result<ContentDigest> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let mut hasher = Md5::new();
        let mut size = 0usize;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            size += chunk.len();
            hasher.update(&chunk);
        }

        let digest = ContentDigest::from(hasher.finalize());
        log::debug!("Fetched {} ({} bytes, md5 {})", url, size, digest);
        Ok(digest)
    }
}
