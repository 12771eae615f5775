//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// Built once at startup and passed into the adapters and the watch loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Content fetcher settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Control-plane connection; absent when running outside a FaaS host
    #[serde(default)]
    pub runtime: Option<RuntimeConfig>,

    /// Object store holding the last seen digest per target
    #[serde(default)]
    pub store: StoreConfig,

    /// Change notification settings
    #[serde(default)]
    pub email: EmailConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::config("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::config("fetch.timeout_secs must be > 0"));
        }
        if let Some(runtime) = &self.runtime {
            if runtime.address.trim().is_empty() {
                return Err(AppError::config("runtime.address is empty"));
            }
        }
        self.store.validate()?;
        if !self.email.recipients().is_empty() && self.email.smtp.host.trim().is_empty() {
            return Err(AppError::config(
                "email.smtp.host must be set when recipients are configured",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            runtime: None,
            store: StoreConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

/// Content fetcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// FaaS control-plane flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Alibaba Cloud Function Compute custom runtime
    Aliyun,
    /// Tencent Cloud Serverless Cloud Function custom runtime
    Tencent,
}

impl std::str::FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "aliyun" | "fc" => Ok(Self::Aliyun),
            "tencent" | "scf" => Ok(Self::Tencent),
            other => Err(AppError::config(format!("unknown platform '{other}'"))),
        }
    }
}

/// Control-plane connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub platform: Platform,

    /// `host:port` of the runtime API
    pub address: String,

    /// API version segment (Function Compute only)
    #[serde(default = "defaults::api_version")]
    pub api_version: String,
}

/// Object store backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Alibaba Cloud OSS through its S3-compatible API
    Oss(OssConfig),
    /// Tencent Cloud COS through its S3-compatible API
    Cos(CosConfig),
    /// AWS S3 with ambient credentials
    S3(S3Config),
    /// Local directory
    Local(LocalConfig),
}

impl StoreConfig {
    /// Short name of the selected backend.
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreConfig::Oss(_) => "oss",
            StoreConfig::Cos(_) => "cos",
            StoreConfig::S3(_) => "s3",
            StoreConfig::Local(_) => "local",
        }
    }

    fn validate(&self) -> Result<()> {
        let required: Vec<(&str, &str)> = match self {
            StoreConfig::Oss(oss) => vec![
                ("store.endpoint", oss.endpoint.as_str()),
                ("store.bucket", oss.bucket.as_str()),
                ("store.access_key_id", oss.access_key_id.as_str()),
                ("store.access_key_secret", oss.access_key_secret.as_str()),
            ],
            StoreConfig::Cos(cos) => vec![
                ("store.bucket_url", cos.bucket_url.as_str()),
                ("store.secret_id", cos.secret_id.as_str()),
                ("store.secret_key", cos.secret_key.as_str()),
            ],
            StoreConfig::S3(s3) => vec![("store.bucket", s3.bucket.as_str())],
            StoreConfig::Local(local) => {
                if local.root.as_os_str().is_empty() {
                    return Err(AppError::config("store.root is empty"));
                }
                Vec::new()
            }
        };

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::config(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Local(LocalConfig {
            root: defaults::store_root(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OssConfig {
    /// e.g. `https://oss-cn-hangzhou.aliyuncs.com`
    pub endpoint: String,
    pub bucket: String,
    /// Signing region; derived from the endpoint host when absent
    #[serde(default)]
    pub region: Option<String>,
    pub access_key_id: String,
    pub access_key_secret: String,
    /// STS token handed to the function by the platform
    #[serde(default)]
    pub security_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosConfig {
    /// e.g. `https://examplebucket-1250000000.cos.ap-guangzhou.myqcloud.com`
    pub bucket_url: String,
    pub secret_id: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "defaults::store_root")]
    pub root: PathBuf,
}

/// Change notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Recipient addresses
    #[serde(default)]
    pub to: Vec<String>,

    /// Sender address; the SMTP username is used when absent
    #[serde(default)]
    pub from: Option<String>,

    /// Display name placed in front of the sender address
    #[serde(default = "defaults::sender_name")]
    pub sender_name: String,

    #[serde(default = "defaults::subject")]
    pub subject: String,

    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl EmailConfig {
    /// Configured recipients with blanks removed.
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect()
    }

    /// Sender address, falling back to the SMTP username.
    pub fn sender(&self) -> Option<&str> {
        self.from
            .as_deref()
            .or(self.smtp.username.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            to: Vec::new(),
            from: None,
            sender_name: defaults::sender_name(),
            subject: defaults::subject(),
            smtp: SmtpConfig::default(),
        }
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,

    /// Defaults to 465 with implicit TLS, 25 otherwise
    #[serde(default)]
    pub port: Option<u16>,

    /// Connect with implicit TLS instead of plain + STARTTLS
    #[serde(default)]
    pub tls: bool,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl SmtpConfig {
    pub fn resolved_port(&self) -> u16 {
        match (self.port, self.tls) {
            (Some(port), _) => port,
            (None, true) => 465,
            (None, false) => 25,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; webwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }

    // Runtime defaults
    pub fn api_version() -> String {
        "2020-11-11".into()
    }

    // Store defaults
    pub fn store_root() -> PathBuf {
        PathBuf::from("storage")
    }

    // Email defaults
    pub fn sender_name() -> String {
        "web watcher".into()
    }
    pub fn subject() -> String {
        "Website update notice".into()
    }
}
