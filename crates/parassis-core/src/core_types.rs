//! Core type definitions shared across the reader
//!
//! These types form the contract between the external collaborators (page
//! store, settings store, UI sink) and the summary engine. Page records are
//! owned by the page store; the request-scoped types (`ThreadContext`,
//! message lists) are created per invocation and discarded when the call
//! completes.

use serde::{Deserialize, Serialize};

/// One record in the page store. `heading == 0` marks a readable body page;
/// `heading > 0` marks a breadcrumb entry at that heading level, interleaved
/// between pages. Ids are assigned monotonically on insert and define the
/// reading sequence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: u64,
    pub content: String,
    pub heading: u32,
}

impl PageRecord {
    pub fn is_body(&self) -> bool {
        self.heading == 0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Reading context assembled for one thread-summary request: the target page,
/// the trimmed prior-page context and the active heading breadcrumb, one
/// entry per level sorted ascending by level.
#[derive(Debug, Clone)]
pub struct ThreadContext {
    pub target: PageRecord,
    pub context: String,
    pub breadcrumb: Vec<(u32, String)>,
}

/// Sink for the three UI callback slots. Implementations must tolerate being
/// invoked zero or more times per request; no call carries a return value.
pub trait SummarySink: Send + Sync {
    /// Human-readable phase description, purely for UI feedback.
    fn status(&self, message: &str);
    /// Terminal failure description for the current request.
    fn error(&self, message: &str);
    /// One incremental piece of generated text.
    fn fragment(&self, text: &str);
}

/// Sink that discards every event.
pub struct NullSink;

impl SummarySink for NullSink {
    fn status(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn fragment(&self, _text: &str) {}
}
