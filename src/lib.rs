// src/lib.rs

//! Web page watcher for FaaS timer triggers.
//!
//! Each invocation carries a URL. The page is fetched and hashed, and when
//! the digest differs from the one recorded in object storage an email goes
//! out and the new digest is recorded.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
