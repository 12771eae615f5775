//! Service layer for the watcher.
//!
//! - Page fetching and digesting (`ContentFetcher`)
//! - Change notification (`Notifier`, `EmailNotifier`)

mod fetcher;
mod notifier;

pub use fetcher::ContentFetcher;
pub use notifier::{EmailNotifier, Notifier};
