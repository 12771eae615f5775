//! FaaS control-plane adapters.
//!
//! A custom runtime pulls invocations from a local HTTP API and posts the
//! outcome back. Alibaba Cloud Function Compute and Tencent Cloud SCF speak
//! slightly different dialects of that protocol; each dialect lives in its own
//! module and the rest of the crate only sees [`EventSource`].

mod aliyun;
mod tencent;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use thiserror::Error;

use crate::error::{AppError, Result};
use crate::models::{Invocation, Platform, RuntimeConfig};
use crate::utils::http::create_runtime_client;

pub use aliyun::AliyunRuntime;
pub use tencent::TencentRuntime;

const CONTENT_TYPE: &str = "text/plain";

/// Source of invocations and sink of their outcomes.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Tell the control plane the function finished initialising.
    async fn ready(&self) -> Result<()> {
        Ok(())
    }

    /// Block until the next invocation is delivered.
    async fn next(&self) -> std::result::Result<Invocation, InvocationError>;

    /// Acknowledge a successful invocation. Failures are logged.
    async fn report_success(&self, request_id: &str);

    /// Report a failed invocation with a readable message. Failures are logged.
    async fn report_error(&self, message: &str, request_id: &str);
}

/// Failure to obtain an invocation.
///
/// Carries whatever request id was read before the failure (possibly empty)
/// so the error can still be reported against it.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct InvocationError {
    pub request_id: String,
    #[source]
    pub source: AppError,
}

impl InvocationError {
    pub fn new(request_id: impl Into<String>, source: impl Into<AppError>) -> Self {
        Self {
            request_id: request_id.into(),
            source: source.into(),
        }
    }
}

/// Build the event source for the configured platform.
pub fn from_config(config: &RuntimeConfig) -> Result<Arc<dyn EventSource>> {
    let client = create_runtime_client()?;
    let source: Arc<dyn EventSource> = match config.platform {
        Platform::Aliyun => Arc::new(AliyunRuntime::new(
            client,
            &config.address,
            &config.api_version,
        )),
        Platform::Tencent => Arc::new(TencentRuntime::new(client, &config.address)),
    };
    Ok(source)
}

/// Base URL for a runtime API address, which may or may not carry a scheme.
fn base_url(address: &str) -> String {
    let address = address.trim_end_matches('/');
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

/// Value of the correlation header, or empty when absent.
fn header_value(response: &Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// POST a plain-text body and require a success status.
async fn post_text(client: &Client, url: &str, body: String) -> Result<()> {
    client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
        .body(body)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
