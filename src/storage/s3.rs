//! S3-compatible object storage implementation.
//!
//! Alibaba Cloud OSS and Tencent Cloud COS both expose the S3 API, so one
//! client serves every vendor. The vendors differ only in how the endpoint,
//! signing region and credentials are derived from their native settings.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{
    BehaviorVersion, Credentials, Region, RequestChecksumCalculation,
    ResponseChecksumValidation,
};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CosConfig, OssConfig, S3Config};
use crate::storage::ObjectStore;

const OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Explicit connection settings for an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct S3Endpoint {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// Address the bucket in the path instead of the host name
    pub path_style: bool,
}

/// S3-based digest storage.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Connect to an S3-compatible endpoint with static credentials.
    pub fn connect(endpoint: &S3Endpoint) -> Self {
        let credentials = Credentials::new(
            endpoint.access_key_id.clone(),
            endpoint.secret_access_key.clone(),
            endpoint.session_token.clone(),
            None,
            "webwatch",
        );

        // Compatible vendors reject the checksum headers newer SDKs send by default
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(endpoint.region.clone()))
            .endpoint_url(endpoint.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(endpoint.path_style)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(OPERATION_TIMEOUT)
                    .build(),
            )
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        Self::new(Client::from_conf(config), endpoint.bucket.clone())
    }

    /// Alibaba Cloud OSS.
    pub fn oss(config: &OssConfig) -> Result<Self> {
        let endpoint = with_scheme(&config.endpoint);
        let region = match &config.region {
            Some(region) => region.clone(),
            None => oss_region(&endpoint)?,
        };

        Ok(Self::connect(&S3Endpoint {
            endpoint,
            region,
            bucket: config.bucket.clone(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.access_key_secret.clone(),
            session_token: config.security_token.clone(),
            path_style: false,
        }))
    }

    /// Tencent Cloud COS, addressed by its bucket URL.
    pub fn cos(config: &CosConfig) -> Result<Self> {
        let bucket = CosBucket::parse(&config.bucket_url)?;

        Ok(Self::connect(&S3Endpoint {
            endpoint: bucket.endpoint,
            region: bucket.region,
            bucket: bucket.name,
            access_key_id: config.secret_id.clone(),
            secret_access_key: config.secret_key.clone(),
            session_token: None,
            path_style: false,
        }))
    }

    /// AWS S3 with credentials from the ambient provider chain.
    pub async fn aws(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared).timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(OPERATION_TIMEOUT)
                .build(),
        );
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone()).force_path_style(true);
        }

        Self::new(Client::from_conf(builder.build()), config.bucket.clone())
    }

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> Result<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(AppError::storage(key, DisplayErrorContext(&service_err)))
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if !self.exists(key).await? {
            log::info!("No existing digest at s3://{}/{}", self.bucket, key);
            return Ok(None);
        }

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::storage(key, e))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                // Deleted between the existence check and the read
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(AppError::storage(key, DisplayErrorContext(&service_err)))
                }
            }
        }
    }

    async fn put_object(&self, key: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type("application/octet-stream")
            .send()
            .await
            .map_err(|e| AppError::storage(key, DisplayErrorContext(&e)))?;

        log::info!(
            "Wrote {} bytes to s3://{}/{}",
            data.len(),
            self.bucket,
            key
        );
        Ok(())
    }
}

fn with_scheme(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

/// Signing region of an OSS endpoint, e.g. `oss-cn-hangzhou` for
/// `https://oss-cn-hangzhou-internal.aliyuncs.com`.
fn oss_region(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint)
        .map_err(|e| AppError::config(format!("invalid OSS endpoint '{endpoint}': {e}")))?;
    let label = url
        .host_str()
        .and_then(|host| host.split('.').next())
        .filter(|label| label.starts_with("oss-"))
        .ok_or_else(|| {
            AppError::config(format!(
                "cannot derive region from OSS endpoint '{endpoint}'; set OSS_REGION"
            ))
        })?;
    Ok(label.trim_end_matches("-internal").to_string())
}

/// A COS bucket URL split into its S3 parts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CosBucket {
    endpoint: String,
    name: String,
    region: String,
}

impl CosBucket {
    /// Parse `https://{bucket}.cos.{region}.myqcloud.com`.
    fn parse(bucket_url: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            AppError::config(format!("invalid COS bucket URL '{bucket_url}': {reason}"))
        };

        let url = Url::parse(bucket_url).map_err(|e| invalid(&e.to_string()))?;
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let (name, service_host) = host
            .split_once('.')
            .ok_or_else(|| invalid("missing bucket name"))?;

        let mut labels = service_host.split('.');
        if labels.next() != Some("cos") {
            return Err(invalid("expected {bucket}.cos.{region}.myqcloud.com"));
        }
        let region = labels
            .next()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| invalid("missing region"))?;

        Ok(Self {
            endpoint: format!("{}://{}", url.scheme(), service_host),
            name: name.to_string(),
            region: region.to_string(),
        })
    }
}
