// src/pipeline/watch.rs

//! The watch loop.
//!
//! For every invocation: fetch the target, compare its digest with the stored
//! one, notify and persist on change, then report the outcome.
//!
//! ```text
//! WAITING ──next()──▶ FETCHING ──▶ DIFFING ──equal──────────────────▶ REPORTING
//!    ▲                   │            │                                 │
//!    │                   │            └─differs─▶ NOTIFYING ─▶ PERSISTING ┤
//!    │                   └──────── error ────────────────────────────────┤
//!    └───────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{Config, Invocation, WatchTarget};
use crate::pipeline::check::{Change, Checker};
use crate::runtime::{self, EventSource};

/// Pause after the control plane failed to hand out an invocation.
pub const RECEIVE_FAILURE_PAUSE: Duration = Duration::from_secs(1);

/// What was reported to the control plane for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded { request_id: String, change: Change },
    Failed { request_id: String, message: String },
}

/// Drives invocations from an event source through a [`Checker`] and
/// reports each outcome back.
pub struct Watcher {
    source: Arc<dyn EventSource>,
    checker: Checker,
}

impl Watcher {
    pub fn new(source: Arc<dyn EventSource>, checker: Checker) -> Self {
        Self { source, checker }
    }

    /// Wire up every collaborator from the configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let runtime = config
            .runtime
            .as_ref()
            .ok_or_else(|| AppError::config("no runtime API configured"))?;

        Ok(Self::new(
            runtime::from_config(runtime)?,
            Checker::from_config(config).await?,
        ))
    }

    /// Signal readiness, then process invocations forever.
    ///
    /// When no invocation can be obtained the loop pauses for
    /// [`RECEIVE_FAILURE_PAUSE`] before asking again.
    pub async fn run(&self) -> Result<()> {
        self.source.ready().await?;
        log::info!("Runtime ready, waiting for invocations");

        loop {
            match self.receive().await {
                Ok(invocation) => {
                    self.process(invocation).await;
                }
                Err(_) => tokio::time::sleep(RECEIVE_FAILURE_PAUSE).await,
            }
        }
    }

    /// Process exactly one invocation end to end, including the report.
    pub async fn poll_once(&self) -> PollOutcome {
        match self.receive().await {
            Ok(invocation) => self.process(invocation).await,
            Err(outcome) => outcome,
        }
    }

    /// Pull the next invocation, reporting the failure when there is none.
    async fn receive(&self) -> std::result::Result<Invocation, PollOutcome> {
        match self.source.next().await {
            Ok(invocation) => Ok(invocation),
            Err(err) => {
                let message = format!("get trigger payload failed: {err}");
                log::error!("{}", message);
                // Report even with an empty id so the invocation is not orphaned
                self.source.report_error(&message, &err.request_id).await;
                Err(PollOutcome::Failed {
                    request_id: err.request_id,
                    message,
                })
            }
        }
    }

    async fn process(&self, invocation: Invocation) -> PollOutcome {
        log::info!(
            "Invocation {} (trigger {:?} at {:?})",
            invocation.request_id,
            invocation.trigger_name,
            invocation.trigger_time
        );

        match self.handle(&invocation).await {
            Ok(change) => {
                self.source.report_success(&invocation.request_id).await;
                PollOutcome::Succeeded {
                    request_id: invocation.request_id,
                    change,
                }
            }
            Err(err) => {
                let message = err.to_string();
                log::error!("Invocation {} failed: {}", invocation.request_id, message);
                self.source
                    .report_error(&message, &invocation.request_id)
                    .await;
                PollOutcome::Failed {
                    request_id: invocation.request_id,
                    message,
                }
            }
        }
    }

    async fn handle(&self, invocation: &Invocation) -> Result<Change> {
        let target = WatchTarget::parse(&invocation.payload)?;
        self.checker.check(&target).await
    }
}
