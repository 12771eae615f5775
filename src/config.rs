// src/config.rs

//! Configuration loading utilities.
//!
//! The FaaS host hands settings to the function through environment
//! variables. [`from_env`] maps them onto [`Config`]; [`load_config`] reads
//! a TOML file for local runs.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::models::{
    Config, CosConfig, EmailConfig, FetchConfig, LocalConfig, OssConfig, Platform,
    RuntimeConfig, S3Config, SmtpConfig, StoreConfig,
};

/// Build the configuration from process environment variables.
pub fn from_env() -> Result<Config> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Build the configuration from an arbitrary variable lookup.
pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let env = Env(lookup);
    let config = Config {
        fetch: env.fetch()?,
        runtime: env.runtime()?,
        store: env.store()?,
        email: env.email()?,
    };
    config.validate()?;
    Ok(config)
}

/// Load and validate a TOML configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    config.validate()?;
    Ok(config)
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Trimmed, non-empty value of a variable.
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, name: &str) -> Result<String> {
        self.get(name)
            .ok_or_else(|| AppError::config(format!("environment variable {name} is not set")))
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|v| {
                v.parse()
                    .map_err(|e| AppError::config(format!("invalid {name}='{v}': {e}")))
            })
            .transpose()
    }

    fn flag(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false)
    }

    fn fetch(&self) -> Result<FetchConfig> {
        let mut fetch = FetchConfig::default();
        if let Some(secs) = self.parse::<u64>("FETCH_TIMEOUT_SECS")? {
            fetch.timeout_secs = secs;
        }
        if let Some(agent) = self.get("FETCH_USER_AGENT") {
            fetch.user_agent = agent;
        }
        Ok(fetch)
    }

    fn runtime(&self) -> Result<Option<RuntimeConfig>> {
        let platform = match self.parse::<Platform>("WATCH_PLATFORM")? {
            Some(platform) => platform,
            None if self.get("FC_RUNTIME_API").is_some() => Platform::Aliyun,
            None if self.get("SCF_RUNTIME_API").is_some() => Platform::Tencent,
            None => return Ok(None),
        };

        let mut runtime = RuntimeConfig {
            platform,
            address: String::new(),
            api_version: "2020-11-11".to_string(),
        };
        match platform {
            Platform::Aliyun => {
                runtime.address = self.require("FC_RUNTIME_API")?;
                if let Some(version) = self.get("FC_RUNTIME_API_VERSION") {
                    runtime.api_version = version;
                }
            }
            Platform::Tencent => {
                let host = self.require("SCF_RUNTIME_API")?;
                let port: u16 = self
                    .parse("SCF_RUNTIME_API_PORT")?
                    .ok_or_else(|| AppError::config("SCF_RUNTIME_API_PORT is not set"))?;
                runtime.address = format!("{host}:{port}");
            }
        }
        Ok(Some(runtime))
    }

    fn store(&self) -> Result<StoreConfig> {
        let backend = match self.get("STORE_BACKEND") {
            Some(backend) => backend.to_lowercase(),
            None if self.get("OSS_BUCKET").is_some() => "oss".to_string(),
            None if self.get("BUCKET_URL").is_some() => "cos".to_string(),
            None if self.get("S3_BUCKET").is_some() => "s3".to_string(),
            None if self.get("STORE_DIR").is_some() => "local".to_string(),
            None => {
                return Err(AppError::config(
                    "no object store configured (set OSS_BUCKET, BUCKET_URL, S3_BUCKET or STORE_DIR)",
                ));
            }
        };

        match backend.as_str() {
            "oss" => Ok(StoreConfig::Oss(OssConfig {
                endpoint: self.require("OSS_ENDPOINT")?,
                bucket: self.require("OSS_BUCKET")?,
                region: self.get("OSS_REGION"),
                access_key_id: self.require("accessKeyID")?,
                access_key_secret: self.require("accessKeySecret")?,
                security_token: self.get("securityToken"),
            })),
            "cos" => Ok(StoreConfig::Cos(CosConfig {
                bucket_url: self.require("BUCKET_URL")?,
                secret_id: self.require("COS_SECRETID")?,
                secret_key: self.require("COS_SECRETKEY")?,
            })),
            "s3" => Ok(StoreConfig::S3(S3Config {
                bucket: self.require("S3_BUCKET")?,
                region: self.get("S3_REGION"),
                endpoint: self.get("S3_ENDPOINT"),
            })),
            "local" => Ok(StoreConfig::Local(LocalConfig {
                root: PathBuf::from(self.require("STORE_DIR")?),
            })),
            other => Err(AppError::config(format!("unknown STORE_BACKEND '{other}'"))),
        }
    }

    fn email(&self) -> Result<EmailConfig> {
        let mut email = EmailConfig {
            to: self
                .get("EMAIL_TO")
                .map(|list| list.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            from: self.get("EMAIL_FROM"),
            smtp: SmtpConfig {
                host: self.get("SMTP_HOST").unwrap_or_default(),
                port: self.parse("SMTP_PORT")?,
                tls: self.flag("SMTP_TLS"),
                username: self.get("SMTP_USERNAME"),
                password: self.get("SMTP_PASSWORD"),
            },
            ..EmailConfig::default()
        };
        if let Some(name) = self.get("EMAIL_SENDER_NAME") {
            email.sender_name = name;
        }
        if let Some(subject) = self.get("EMAIL_SUBJECT") {
            email.subject = subject;
        }
        Ok(email)
    }
}
