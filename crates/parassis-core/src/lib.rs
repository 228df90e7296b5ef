//! Core library for the Parassis long-document reader.
//!
//! Parassis paginates an uploaded text or markdown file, keeps the pages in
//! a client-owned store, and augments each page with an LLM-generated
//! contextual summary that threads plot and topic continuity across
//! previously read pages. This crate holds the engine behind that feature.
//!
//! # Architecture Overview
//!
//! The engine is organized around five components:
//!
//! - **Provider adapter registry**: per-provider endpoint, auth and
//!   request/response shapes behind one uniform interface
//! - **Context assembler**: bounded window of prior pages plus the active
//!   heading breadcrumb for a target page
//! - **Prompt builder**: provider-agnostic instructions, including
//!   pre-summarization of over-budget pages
//! - **Streaming response pump**: SSE and single-document response framing
//!   demultiplexed into ordered text fragments
//! - **Orchestrator**: the request lifecycle behind `generate_thread_summary`
//!   and `chat_with_ai`, with defined failure semantics
//!
//! Collaborator stores (pages, settings) and the UI sink are injected as
//! trait objects at call time; the core owns no persistent state.

pub mod context;
pub mod core_types;
pub mod errors;
pub mod llm;
pub mod navigation;
pub mod pagination;
pub mod prompt;
pub mod store;
pub mod summarizer;

pub use core_types::{Message, NullSink, PageRecord, Role, SummarySink, ThreadContext};
pub use errors::ReaderError;
pub use llm::{Provider, ProviderAdapter};
pub use navigation::Direction;
pub use store::{
    MemoryPageStore, MemorySettingsStore, PageStore, SettingsStore,
};
pub use summarizer::{chat_with_ai, generate_thread_summary};

#[cfg(test)]
pub mod test_utils;
