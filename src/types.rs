//! Core domain types for the board relay.
//!
//! Newtype wrappers prevent accidental mixing of identifier-like strings and
//! make signatures self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifier of a trigger event (typically a webhook delivery ID).
///
/// Used to deduplicate redeliveries of the same logical event. Empty
/// identifiers never participate in deduplication; callers should map an
/// empty string to "no identifier" before constructing one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new event ID from a non-empty string.
    ///
    /// Returns `None` for empty input so that "no identifier" and
    /// "identifier" stay distinct in the type system.
    pub fn new(s: impl Into<String>) -> Option<Self> {
        let s = s.into();
        if s.is_empty() { None } else { Some(EventId(s)) }
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of trigger that produced a sync task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// A manual request (HTTP call or scheduled tick).
    Manual,
    /// An inbound webhook delivery.
    Webhook,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Manual => write!(f, "manual"),
            TriggerKind::Webhook => write!(f, "webhook"),
        }
    }
}

/// Observability snapshot of the coordinator, served by `GET /status`.
///
/// Reading it has no side effects beyond the rate window's lazy purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Number of tasks waiting in the queue (forced + normal).
    pub queue_length: usize,
    /// Whether the drain loop is currently running.
    pub is_draining: bool,
    /// Number of board calls recorded in the trailing rate window.
    pub recent_call_count: usize,
}
