//! Error types for failure handling across the reader core
//!
//! This module provides a unified error hierarchy covering every failure mode
//! of a summary or chat request. Errors are categorized by their source
//! (configuration, transport, response parsing, missing content, store access)
//! so the orchestrator can surface a precise message through the error channel
//! while guaranteeing that nothing escapes past its boundary.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ReaderError {
    #[error("LLM request failed: {0}")]
    Llm(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Content error: {0}")]
    Content(String),
    #[error("Store error: {0}")]
    Store(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ReaderError {
    fn from(err: std::io::Error) -> Self {
        ReaderError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for ReaderError {
    fn from(err: reqwest::Error) -> Self {
        ReaderError::Llm(err.to_string())
    }
}
