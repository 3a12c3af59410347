//! Cursor-driven retrieval of the complete document list.

use async_trait::async_trait;
use challenge_core::model::{DocumentFilter, DocumentPage, RemoteDocument};

use crate::error::SyncError;

/// Upper bound on pages requested by one `fetch_all` call.
pub const DEFAULT_MAX_PAGES: usize = 1_000;

/// One page request against the remote document list.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the page at `cursor` (the first page when `None`).
    ///
    /// # Errors
    ///
    /// Returns `SyncError` on transport failures or unparseable responses.
    async fn fetch_page(
        &self,
        token: &str,
        filter: &DocumentFilter,
        cursor: Option<&str>,
    ) -> Result<DocumentPage, SyncError>;
}

/// Follow `nextPageCursor` until the server stops returning one.
///
/// Results are concatenated in the order pages arrive. The first failing
/// request aborts the whole call; nothing is retried. At least one page is
/// always requested.
///
/// # Errors
///
/// Returns the first page error, or `SyncError::PageLimitExceeded` when
/// `max_pages` pages all carried a cursor.
pub async fn fetch_all(
    source: &dyn DocumentSource,
    token: &str,
    filter: &DocumentFilter,
    max_pages: usize,
) -> Result<Vec<RemoteDocument>, SyncError> {
    let limit = max_pages.max(1);
    let mut documents = Vec::new();
    let mut cursor: Option<String> = None;

    for page_number in 1..=limit {
        let page = source.fetch_page(token, filter, cursor.as_deref()).await?;
        let next = page.next_cursor().map(str::to_owned);
        tracing::debug!(
            page = page_number,
            results = page.results.len(),
            has_next = next.is_some(),
            "received document page"
        );
        documents.extend(page.results);

        match next {
            Some(next) => cursor = Some(next),
            None => return Ok(documents),
        }
    }

    Err(SyncError::PageLimitExceeded { limit })
}
