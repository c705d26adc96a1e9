//! Result draining.
//!
//! Pages through a backend cursor until an empty page comes back, accumulating
//! every record into one collection. The loop is strictly sequential since each
//! page depends on the cursor returned by the previous one.

use super::backend::{Page, PageCursor, SearchBackend, SearchError};
use super::filter::Predicate;
use crate::models::LogRecord;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default number of records requested per round-trip.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Largest page size a backend accepts in a single round-trip.
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Default cursor keep-alive window.
pub const DEFAULT_SCROLL_WINDOW: Duration = Duration::from_secs(60);

/// Pagination and deadline settings for a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainOptions {
    /// Records requested per round-trip.
    pub page_size: usize,
    /// How long the backend keeps the cursor alive between calls.
    pub scroll_window: Duration,
    /// Upper bound on the whole drain, measured from its start.
    pub deadline: Option<Duration>,
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            scroll_window: DEFAULT_SCROLL_WINDOW,
            deadline: None,
        }
    }
}

impl DrainOptions {
    /// Sets the page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Sets the cursor keep-alive window.
    #[must_use]
    pub fn with_scroll_window(mut self, scroll_window: Duration) -> Self {
        self.scroll_window = scroll_window;
        self
    }

    /// Sets the overall deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Retrieves every record of `index` matching `predicate`.
///
/// Issues one `query` followed by `next` calls until a page comes back empty.
/// Records are returned in arrival order; sorting by timestamp is the caller's
/// job. The last cursor seen is released whether the drain succeeds or fails;
/// release failures are only logged.
///
/// A drain never returns a partial result: if `cancel` fires or the deadline in
/// `options` passes before the empty page arrives, the records gathered so far
/// are discarded and the in-flight call is abandoned.
///
/// # Errors
///
/// Returns [`SearchError::Cancelled`] or [`SearchError::DeadlineExceeded`] as
/// described above, or any error raised by the backend (notably
/// [`SearchError::CursorExpired`]).
///
/// # Example
///
/// ```
/// use shared::models::LogRecord;
/// use shared::search::{drain, DrainOptions, InMemorySearchBackend, Predicate};
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let backend = InMemorySearchBackend::new();
/// let now = chrono::Utc::now();
/// backend
///     .insert("shop-api", (0..5).map(|i| LogRecord::new("Error", format!("e{i}"), now)).collect())
///     .unwrap();
///
/// let options = DrainOptions::default().with_page_size(2);
/// let records = drain(&backend, "shop-api", &Predicate::match_all(), options, &CancellationToken::new())
///     .await
///     .unwrap();
/// assert_eq!(records.len(), 5);
/// # });
/// ```
pub async fn drain(
    backend: &dyn SearchBackend,
    index: &str,
    predicate: &Predicate,
    options: DrainOptions,
    cancel: &CancellationToken,
) -> Result<Vec<LogRecord>, SearchError> {
    let mut cursor = None;
    let result = drain_pages(backend, index, predicate, options, cancel, &mut cursor).await;

    if let Some(cursor) = cursor {
        if let Err(e) = backend.release(&cursor).await {
            tracing::warn!(index = %index, error = %e, "Failed to release search cursor");
        }
    }

    result
}

/// The paging loop of [`drain`]. Keeps `cursor` pointing at the most recent
/// cursor handed out by the backend so the caller can release it whatever the
/// outcome.
async fn drain_pages(
    backend: &dyn SearchBackend,
    index: &str,
    predicate: &Predicate,
    options: DrainOptions,
    cancel: &CancellationToken,
    cursor: &mut Option<PageCursor>,
) -> Result<Vec<LogRecord>, SearchError> {
    let deadline = options.deadline.map(|d| Instant::now() + d);

    let mut page = guarded(
        backend.query(index, predicate, options.page_size, options.scroll_window),
        deadline,
        cancel,
    )
    .await?;
    *cursor = Some(page.cursor.clone());

    let mut records = Vec::new();
    let mut pages = 0usize;

    while !page.records.is_empty() {
        pages += 1;
        tracing::debug!(
            index = %index,
            page = pages,
            size = page.records.len(),
            "Received search page"
        );
        records.extend(std::mem::take(&mut page.records));

        let current = page.cursor.clone();
        page = guarded(
            backend.next(&current, options.scroll_window),
            deadline,
            cancel,
        )
        .await?;
        *cursor = Some(page.cursor.clone());
    }

    tracing::debug!(
        index = %index,
        pages,
        total = records.len(),
        "Search drained"
    );

    Ok(records)
}

/// Runs one backend call under the drain's deadline and cancellation token.
///
/// Both are checked before the call is issued so that a backend which answers
/// instantly still cannot keep the loop alive past the deadline.
async fn guarded<F>(
    call: F,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> Result<Page, SearchError>
where
    F: Future<Output = Result<Page, SearchError>>,
{
    if cancel.is_cancelled() {
        tracing::warn!("Search cancelled mid-drain");
        return Err(SearchError::Cancelled);
    }

    let Some(deadline) = deadline else {
        return tokio::select! {
            () = cancel.cancelled() => {
                tracing::warn!("Search cancelled mid-drain");
                Err(SearchError::Cancelled)
            }
            result = call => result,
        };
    };

    if Instant::now() >= deadline {
        tracing::warn!("Search deadline exceeded mid-drain");
        return Err(SearchError::DeadlineExceeded);
    }

    tokio::select! {
        () = cancel.cancelled() => {
            tracing::warn!("Search cancelled mid-drain");
            Err(SearchError::Cancelled)
        }
        () = tokio::time::sleep_until(deadline) => {
            tracing::warn!("Search deadline exceeded mid-drain");
            Err(SearchError::DeadlineExceeded)
        }
        result = call => result,
    }
}
