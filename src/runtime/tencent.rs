//! Tencent Cloud SCF custom runtime API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::Invocation;
use crate::runtime::{EventSource, InvocationError, base_url, header_value, post_text};

const REQUEST_ID_HEADER: &str = "request_id";

/// Timer trigger envelope as delivered by SCF.
#[derive(Debug, Deserialize)]
struct TimerTrigger {
    #[serde(rename = "Time", default)]
    trigger_time: Option<String>,
    #[serde(rename = "TriggerName", default)]
    trigger_name: Option<String>,
    #[serde(rename = "Message", default)]
    payload: String,
}

/// Event source backed by `/runtime/invocation/*`.
///
/// SCF tracks the in-flight invocation itself, so outcome reports are not
/// addressed by request id.
pub struct TencentRuntime {
    client: Client,
    endpoint: String,
}

impl TencentRuntime {
    pub fn new(client: Client, address: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/", base_url(address)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

#[async_trait]
impl EventSource for TencentRuntime {
    async fn ready(&self) -> Result<()> {
        post_text(&self.client, &self.url("runtime/init/ready"), String::new()).await
    }

    async fn next(&self) -> std::result::Result<Invocation, InvocationError> {
        let response = self
            .client
            .get(self.url("runtime/invocation/next"))
            .send()
            .await
            .map_err(|e| InvocationError::new("", e))?;

        let request_id = header_value(&response, REQUEST_ID_HEADER);
        let body = response
            .error_for_status()
            .map_err(|e| InvocationError::new(&request_id, e))?
            .bytes()
            .await
            .map_err(|e| InvocationError::new(&request_id, e))?;

        let trigger: TimerTrigger =
            serde_json::from_slice(&body).map_err(|e| InvocationError::new(&request_id, e))?;

        Ok(Invocation::new(request_id, trigger.payload)
            .with_trigger(trigger.trigger_name, trigger.trigger_time))
    }

    async fn report_success(&self, request_id: &str) {
        let url = self.url("runtime/invocation/response");
        if let Err(e) = post_text(&self.client, &url, request_id.to_string()).await {
            // Nothing else can acknowledge this invocation
            log::error!("FATAL: reporting success for {} failed: {}", request_id, e);
        }
    }

    async fn report_error(&self, message: &str, request_id: &str) {
        let url = self.url("runtime/invocation/error");
        if let Err(e) = post_text(&self.client, &url, message.to_string()).await {
            log::error!("Reporting error for {} failed: {}", request_id, e);
        }
    }
}
