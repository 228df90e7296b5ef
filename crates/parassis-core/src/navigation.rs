//! Page-turn navigation over the page store
//!
//! Resolves and advances the current-page pointer kept in the settings
//! store. This is the only place the core writes to a collaborator store:
//! every other access is a read.

use std::str::FromStr;

use crate::core_types::PageRecord;
use crate::errors::ReaderError;
use crate::store::{keys, PageStore, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Returns the page the reader is currently on, falling back to the first
/// body page (and recording it) when no pointer is set yet.
pub async fn current_page(
    pages: &dyn PageStore,
    settings: &dyn SettingsStore,
) -> Result<PageRecord, ReaderError> {
    if let Some(raw) = settings.value(keys::CURRENT_PAGE).await? {
        let id = u64::from_str(&raw)
            .map_err(|_| ReaderError::Store(format!("Invalid current page id: {}", raw)))?;
        if let Some(page) = pages.page_by_id(id).await? {
            if page.is_body() {
                return Ok(page);
            }
        }
    }
    let first = pages
        .first_body_page()
        .await?
        .ok_or_else(|| ReaderError::Content("No content found".to_string()))?;
    settings
        .set_value(keys::CURRENT_PAGE, &first.id.to_string())
        .await?;
    Ok(first)
}

/// Moves the current-page pointer one body page in `direction` and returns
/// the new page. At either end of the document the pointer stays put and a
/// content error reports the boundary.
pub async fn turn_page(
    pages: &dyn PageStore,
    settings: &dyn SettingsStore,
    direction: Direction,
) -> Result<PageRecord, ReaderError> {
    let current = current_page(pages, settings).await?;
    let neighbor = match direction {
        Direction::Forward => pages.body_page_after(current.id).await?,
        Direction::Backward => pages.body_page_before(current.id).await?,
    };
    let next = neighbor.ok_or_else(|| {
        ReaderError::Content(match direction {
            Direction::Forward => "Already on the last page".to_string(),
            Direction::Backward => "Already on the first page".to_string(),
        })
    })?;
    settings
        .set_value(keys::CURRENT_PAGE, &next.id.to_string())
        .await?;
    Ok(next)
}
