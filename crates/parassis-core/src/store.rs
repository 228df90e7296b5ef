//! Page and settings store contracts with in-memory implementations
//!
//! The core treats both stores as read-mostly collaborator interfaces: the
//! summary engine only reads pages and settings, and the only write it ever
//! performs is advancing the current-page pointer during navigation. The
//! in-memory implementations back the CLI and the test suite; anything that
//! can satisfy the traits (an embedded database, a browser storage bridge)
//! can be substituted at call time.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::core_types::PageRecord;
use crate::errors::ReaderError;

/// Well-known settings keys.
pub mod keys {
    pub const LLM_PROVIDER: &str = "llmProvider";
    pub const LLM_TOKEN: &str = "llmToken";
    /// Optional endpoint override, e.g. a self-hosted gateway.
    pub const LLM_ENDPOINT: &str = "llmEndpoint";
    /// Display name of the output language, not a code.
    pub const LANGUAGE: &str = "language";
    pub const CURRENT_PAGE: &str = "currentPage";
    /// When "true", prompts require `$...$` / `$$...$$` math delimiters.
    pub const MATH_RENDERING: &str = "mathRendering";
}

#[async_trait]
pub trait PageStore: Send + Sync {
    async fn page_by_id(&self, id: u64) -> Result<Option<PageRecord>, ReaderError>;

    /// Body pages (`heading == 0`) with id strictly below `id`, most recent
    /// first, at most `limit` records.
    async fn body_pages_before(&self, id: u64, limit: usize)
        -> Result<Vec<PageRecord>, ReaderError>;

    /// The nearest body page with id strictly above `id`.
    async fn body_page_after(&self, id: u64) -> Result<Option<PageRecord>, ReaderError>;

    /// The nearest body page with id strictly below `id`.
    async fn body_page_before(&self, id: u64) -> Result<Option<PageRecord>, ReaderError>;

    async fn first_body_page(&self) -> Result<Option<PageRecord>, ReaderError>;

    /// Heading records (`heading > 0`) with id strictly below `id`, in
    /// ascending id order.
    async fn headings_before(&self, id: u64) -> Result<Vec<PageRecord>, ReaderError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn value(&self, key: &str) -> Result<Option<String>, ReaderError>;
    async fn set_value(&self, key: &str, value: &str) -> Result<(), ReaderError>;
}

/// In-memory page store. Ids are assigned monotonically on `append`, so the
/// insertion order is the reading order.
#[derive(Default)]
pub struct MemoryPageStore {
    inner: Mutex<PageStoreState>,
}

#[derive(Default)]
struct PageStoreState {
    pages: BTreeMap<u64, PageRecord>,
    next_id: u64,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its assigned id.
    pub fn append(&self, content: impl Into<String>, heading: u32) -> u64 {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.next_id += 1;
        let id = state.next_id;
        state.pages.insert(
            id,
            PageRecord {
                id,
                content: content.into(),
                heading,
            },
        );
        id
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_pages<T>(&self, f: impl FnOnce(&BTreeMap<u64, PageRecord>) -> T) -> T {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state.pages)
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn page_by_id(&self, id: u64) -> Result<Option<PageRecord>, ReaderError> {
        Ok(self.with_pages(|pages| pages.get(&id).cloned()))
    }

    async fn body_pages_before(
        &self,
        id: u64,
        limit: usize,
    ) -> Result<Vec<PageRecord>, ReaderError> {
        Ok(self.with_pages(|pages| {
            pages
                .range(..id)
                .rev()
                .filter(|(_, p)| p.is_body())
                .take(limit)
                .map(|(_, p)| p.clone())
                .collect()
        }))
    }

    async fn body_page_after(&self, id: u64) -> Result<Option<PageRecord>, ReaderError> {
        use std::ops::Bound;
        Ok(self.with_pages(|pages| {
            pages
                .range((Bound::Excluded(id), Bound::Unbounded))
                .find(|(_, p)| p.is_body())
                .map(|(_, p)| p.clone())
        }))
    }

    async fn body_page_before(&self, id: u64) -> Result<Option<PageRecord>, ReaderError> {
        Ok(self.with_pages(|pages| {
            pages
                .range(..id)
                .rev()
                .find(|(_, p)| p.is_body())
                .map(|(_, p)| p.clone())
        }))
    }

    async fn first_body_page(&self) -> Result<Option<PageRecord>, ReaderError> {
        Ok(self.with_pages(|pages| {
            pages.values().find(|p| p.is_body()).cloned()
        }))
    }

    async fn headings_before(&self, id: u64) -> Result<Vec<PageRecord>, ReaderError> {
        Ok(self.with_pages(|pages| {
            pages
                .range(..id)
                .filter(|(_, p)| !p.is_body())
                .map(|(_, p)| p.clone())
                .collect()
        }))
    }
}

/// In-memory settings store: at most one value per key.
#[derive(Default)]
pub struct MemorySettingsStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            inner: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Copy of the current key/value map, for persisting between runs.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn value(&self, key: &str) -> Result<Option<String>, ReaderError> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), ReaderError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
