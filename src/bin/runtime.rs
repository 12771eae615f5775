//! FaaS custom runtime entry point for the web watcher.
//!
//! Deploy the binary as the bootstrap of an Alibaba Cloud Function Compute or
//! Tencent Cloud SCF custom runtime function with a timer trigger whose
//! payload is the URL to watch.
//!
//! ## Environment Variables
//!
//! - `FC_RUNTIME_API` / `SCF_RUNTIME_API` + `SCF_RUNTIME_API_PORT`: control plane address
//! - `OSS_BUCKET`, `BUCKET_URL`, `S3_BUCKET` or `STORE_DIR`: digest storage
//! - `EMAIL_TO`, `SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD`: notification
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webwatch::{config, error::Result, pipeline::Watcher};

/// Main entry point for the FaaS runtime.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Web watcher runtime starting...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Runtime bootstrap failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = config::from_env()?;
    let watcher = Watcher::from_config(&config).await?;
    watcher.run().await
}
