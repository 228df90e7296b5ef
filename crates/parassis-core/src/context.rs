//! Reading-context assembly for thread summaries
//!
//! Given a target page, this module rebuilds everything the prompt needs to
//! thread continuity across pages: a bounded window of prior page contents
//! (most recent first) trimmed to a fixed character budget, and the heading
//! breadcrumb active at the target position. Assembly is a pure read over
//! the page store; it performs no network or persistence side effects.

use std::collections::BTreeMap;

use log::debug;

use crate::core_types::{PageRecord, ThreadContext};
use crate::errors::ReaderError;
use crate::store::PageStore;

/// Character budget for the combined prior-page context.
pub const MAX_CONTEXT_CHARS: usize = 2000;
/// Upper bound on the number of prior pages pulled into the window.
pub const MAX_PREV_CONTENTS: usize = 10;

/// Fetches the target page. The id must reference a body page; a missing or
/// heading record is a content error, surfaced by the orchestrator through
/// the error channel.
pub async fn target_page(
    pages: &dyn PageStore,
    target_id: u64,
) -> Result<PageRecord, ReaderError> {
    match pages.page_by_id(target_id).await? {
        Some(page) if page.is_body() => Ok(page),
        _ => Err(ReaderError::Content("No content found".to_string())),
    }
}

/// Builds the trimmed prior-page context: up to [`MAX_PREV_CONTENTS`] body
/// pages preceding the target, most recent first, joined with blank lines.
pub async fn prior_context(pages: &dyn PageStore, target_id: u64) -> Result<String, ReaderError> {
    let prev = pages.body_pages_before(target_id, MAX_PREV_CONTENTS).await?;
    debug!("Found {} previous contents", prev.len());
    let contents: Vec<&str> = prev.iter().map(|p| p.content.as_str()).collect();
    Ok(trim_context(contents.join("\n\n")))
}

/// Trims the combined context to [`MAX_CONTEXT_CHARS`] characters by keeping
/// the leading characters of the most-recent-first combination, so the most
/// recent pages survive and older material falls off the end. A string
/// already within the budget is returned unchanged.
pub fn trim_context(combined: String) -> String {
    let char_count = combined.chars().count();
    debug!("Combined context length: {} chars", char_count);
    if char_count <= MAX_CONTEXT_CHARS {
        return combined;
    }
    debug!("Trimming context to {} chars", MAX_CONTEXT_CHARS);
    combined.chars().take(MAX_CONTEXT_CHARS).collect()
}

/// Reduces the heading records preceding the target to the latest record per
/// level, sorted ascending by level.
pub async fn breadcrumb(
    pages: &dyn PageStore,
    target_id: u64,
) -> Result<Vec<(u32, String)>, ReaderError> {
    let headings = pages.headings_before(target_id).await?;
    let mut latest_per_level: BTreeMap<u32, String> = BTreeMap::new();
    for record in headings {
        latest_per_level.insert(record.heading, record.content);
    }
    Ok(latest_per_level.into_iter().collect())
}

/// Assembles the full reading context for one thread-summary request.
pub async fn assemble(
    pages: &dyn PageStore,
    target_id: u64,
) -> Result<ThreadContext, ReaderError> {
    let target = target_page(pages, target_id).await?;
    let context = prior_context(pages, target_id).await?;
    let breadcrumb = breadcrumb(pages, target_id).await?;
    Ok(ThreadContext {
        target,
        context,
        breadcrumb,
    })
}
