pub mod mock_llm_server;

pub use mock_llm_server::{CannedResponse, MockLlmServer};

use std::sync::{Mutex, PoisonError};

use crate::core_types::SummarySink;

/// Sink that records every callback invocation for assertions.
#[derive(Default)]
pub struct RecordingSink {
    statuses: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    fragments: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn fragments(&self) -> Vec<String> {
        self.fragments.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SummarySink for RecordingSink {
    fn status(&self, message: &str) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn fragment(&self, text: &str) {
        self.fragments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
    }
}
