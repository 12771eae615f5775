//! Storage abstractions for digest persistence.
//!
//! Each watched URL owns a single object holding the raw bytes of its last
//! seen digest:
//!
//! ```text
//! {bucket or root}/
//! ├── aHR0cDovL2V4YW1wbGUuY29tL2E   # 16 bytes, md5 of http://example.com/a
//! └── aHR0cHM6Ly9leGFtcGxlLm9yZw    # 16 bytes, md5 of https://example.org
//! ```

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
#[cfg(not(feature = "s3"))]
use crate::error::AppError;
use crate::models::StoreConfig;

// Re-export for convenience
pub use local::LocalStore;
#[cfg(feature = "s3")]
pub use s3::S3Store;

/// Keyed byte-blob store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the object stored under `key`.
    ///
    /// A missing key is `Ok(None)`, never an error. Any other failure of the
    /// backend is an error.
    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or replace the object under `key`.
    ///
    /// Readers never observe a partially written object.
    async fn put_object(&self, key: &str, data: &[u8]) -> Result<()>;
}

/// Build the backend selected by the configuration.
pub async fn from_config(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>> {
    match config {
        StoreConfig::Local(local) => Ok(Arc::new(LocalStore::new(&local.root))),
        #[cfg(feature = "s3")]
        StoreConfig::Oss(oss) => Ok(Arc::new(S3Store::oss(oss)?)),
        #[cfg(feature = "s3")]
        StoreConfig::Cos(cos) => Ok(Arc::new(S3Store::cos(cos)?)),
        #[cfg(feature = "s3")]
        StoreConfig::S3(s3) => Ok(Arc::new(S3Store::aws(s3).await)),
        #[cfg(not(feature = "s3"))]
        _ => Err(AppError::config(
            "object storage backends require the `s3` feature",
        )),
    }
}
