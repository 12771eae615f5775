// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Object store failure (anything other than "not found")
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (fetch or control plane)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invocation payload could not be understood
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Notification could not be sent
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    /// Several failures collected during a single invocation
    #[error("{}", join_errors(.0))]
    Aggregate(Vec<AppError>),
}

impl AppError {
    /// Create a storage error with the key it concerns.
    pub fn storage(key: &str, message: impl fmt::Display) -> Self {
        Self::Storage(format!("{key}: {message}"))
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Fold collected failures into one error, or `Ok` when there are none.
    pub fn collect(errors: Vec<AppError>) -> Result<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::Aggregate(errors))
        }
    }
}

fn join_errors(errors: &[AppError]) -> String {
    let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join("; "))
}

/// Errors raised while sending a change notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// No recipient is configured
    #[error("mail: no receiver")]
    NoRecipients,

    /// A sender or recipient address is malformed
    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// The message could not be assembled
    #[error("message build failed: {0}")]
    Message(#[from] lettre::error::Error),

    /// SMTP connection, TLS, authentication or delivery failure
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
