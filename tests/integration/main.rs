//! Integration tests for webwatch
//!
//! Uses wiremock to stand in for the watched site, the FaaS control plane
//! and an S3-compatible bucket, and verifies the watch loop end to end.

mod common;

mod test_runtime_api;
#[cfg(feature = "s3")]
mod test_store_contract;
