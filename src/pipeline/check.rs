// src/pipeline/check.rs

//! Change detection for a single target.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, WatchTarget};
use crate::services::{ContentFetcher, EmailNotifier, Notifier};
use crate::storage::{self, ObjectStore};

/// What a check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// No digest was stored yet; the current one was recorded
    FirstSeen,
    /// Digest equals the stored one
    Unchanged,
    /// Digest differs; recipients were notified and the new digest recorded
    Changed,
}

impl Change {
    pub fn as_str(&self) -> &'static str {
        match self {
            Change::FirstSeen => "first seen",
            Change::Unchanged => "unchanged",
            Change::Changed => "changed",
        }
    }
}

/// Fetches a target, diffs it against the stored digest and acts on change.
pub struct Checker {
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
    fetcher: ContentFetcher,
}

impl Checker {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
        fetcher: ContentFetcher,
    ) -> Self {
        Self {
            store,
            notifier,
            fetcher,
        }
    }

    /// Build the store, notifier and fetcher from the configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            storage::from_config(&config.store).await?,
            Arc::new(EmailNotifier::new(config.email.clone())),
            ContentFetcher::new(&config.fetch)?,
        ))
    }

    /// Fetch, diff, and on change notify and persist.
    ///
    /// Notify and persist are both attempted even if the other fails; their
    /// failures are returned together as one [`AppError::Aggregate`].
    pub async fn check(&self, target: &WatchTarget) -> Result<Change> {
        let digest = self.fetcher.fetch(target.url()).await?;
        let key = target.storage_key();

        // An empty object means "never observed", same as a missing one
        let previous = self
            .store
            .get_object(&key)
            .await?
            .filter(|stored| !stored.is_empty());

        if let Some(stored) = &previous {
            if digest.matches(stored) {
                log::info!("{} unchanged ({})", target, digest);
                return Ok(Change::Unchanged);
            }
        }

        let mut errors = Vec::new();
        let change = if previous.is_some() {
            log::info!("{} changed, now {}", target, digest);
            if let Err(e) = self.notifier.notify(target.url()).await {
                log::warn!("Notification for {} failed: {}", target, e);
                errors.push(AppError::from(e));
            }
            Change::Changed
        } else {
            log::info!("{} seen for the first time ({})", target, digest);
            Change::FirstSeen
        };

        if let Err(e) = self.store.put_object(&key, digest.as_bytes()).await {
            log::warn!("Persisting digest for {} failed: {}", target, e);
            errors.push(e);
        }

        AppError::collect(errors)?;
        Ok(change)
    }
}
