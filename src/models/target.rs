//! Watch targets and content digests.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use md5::{Digest, Md5};
use url::Url;

use crate::error::{AppError, Result};

/// A URL being monitored for content changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    url: String,
}

impl WatchTarget {
    /// Extract the target from an invocation payload.
    ///
    /// The payload is the URL itself; surrounding whitespace is ignored.
    pub fn parse(payload: &str) -> Result<Self> {
        let raw = payload.trim();
        if raw.is_empty() {
            return Err(AppError::decode("trigger payload is empty"));
        }

        let parsed = Url::parse(raw)
            .map_err(|e| AppError::decode(format!("payload '{raw}' is not a URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::decode(format!(
                "unsupported scheme '{}' in '{raw}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            url: raw.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Object store key under which this target's digest lives.
    pub fn storage_key(&self) -> String {
        storage_key(&self.url)
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Derive the storage key for a URL: URL-safe base64 without padding.
///
/// Reversible, so distinct URLs never share a key.
pub fn storage_key(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

/// MD5 digest of a fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; ContentDigest::LEN]);

impl ContentDigest {
    pub const LEN: usize = 16;

    /// Digest an in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        Self::from(Md5::digest(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether a stored digest equals this one.
    pub fn matches(&self, stored: &[u8]) -> bool {
        self.0.as_slice() == stored
    }
}

impl From<[u8; ContentDigest::LEN]> for ContentDigest {
    fn from(bytes: [u8; ContentDigest::LEN]) -> Self {
        Self(bytes)
    }
}

impl From<md5::digest::Output<Md5>> for ContentDigest {
    fn from(output: md5::digest::Output<Md5>) -> Self {
        Self(output.into())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
