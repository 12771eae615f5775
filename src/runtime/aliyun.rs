//! Alibaba Cloud Function Compute custom runtime API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::Invocation;
use crate::runtime::{EventSource, InvocationError, base_url, header_value, post_text};

const REQUEST_ID_HEADER: &str = "x-fc-request-id";

/// Timer trigger envelope as delivered by Function Compute.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimerTrigger {
    #[serde(default)]
    trigger_time: Option<String>,
    #[serde(default)]
    trigger_name: Option<String>,
    #[serde(default)]
    payload: String,
}

/// Event source backed by `/{version}/runtime/invocation/*`.
pub struct AliyunRuntime {
    client: Client,
    endpoint: String,
}

impl AliyunRuntime {
    pub fn new(client: Client, address: &str, api_version: &str) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/{}/runtime/invocation/",
                base_url(address),
                api_version.trim_matches('/')
            ),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

#[async_trait]
impl EventSource for AliyunRuntime {
    async fn next(&self) -> Result<Invocation, InvocationError> {
        let response = self
            .client
            .get(self.url("next"))
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
        let url = self.url(&format!("{request_id}/response"));
        if let Err(e) = post_text(&self.client, &url, String::new()).await {
            log::error!("Reporting success for {} failed: {}", request_id, e);
        }
    }

    async fn report_error(&self, message: &str, request_id: &str) {
        let url = self.url(&format!("{request_id}/error"));
        if let Err(e) = post_text(&self.client, &url, message.to_string()).await {
            log::error!("Reporting error for {} failed: {}", request_id, e);
        }
    }
}
