//! Invocation data structure.

use chrono::{DateTime, Utc};

/// One unit of work delivered by the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Opaque trigger payload; carries the target URL
    pub payload: String,

    /// Correlation id required when reporting the outcome
    pub request_id: String,

    /// Name of the timer trigger, when the envelope carries one
    pub trigger_name: Option<String>,

    /// Trigger fire time as sent by the platform
    pub trigger_time: Option<String>,

    /// When this process received the invocation
    pub received_at: DateTime<Utc>,
}

impl Invocation {
    pub fn new(request_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            request_id: request_id.into(),
            trigger_name: None,
            trigger_time: None,
            received_at: Utc::now(),
        }
    }

    /// Attach trigger metadata, ignoring blank values.
    pub fn with_trigger(mut self, name: Option<String>, time: Option<String>) -> Self {
        self.trigger_name = name.filter(|s| !s.is_empty());
        self.trigger_time = time.filter(|s| !s.is_empty());
        self
    }
}
