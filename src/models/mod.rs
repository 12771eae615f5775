// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod invocation;
mod target;

// Re-export all public types
pub use config::{
    Config, CosConfig, EmailConfig, FetchConfig, LocalConfig, OssConfig, Platform,
    RuntimeConfig, S3Config, SmtpConfig, StoreConfig,
};
pub use invocation::Invocation;
pub use target::{ContentDigest, WatchTarget, storage_key};
