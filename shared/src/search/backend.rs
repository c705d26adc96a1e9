//! Search backend trait and implementations.
//!
//! Provides the `SearchBackend` trait abstracting a cursor-paginated search
//! index, and an `InMemorySearchBackend` implementation for development and
//! testing.

use super::filter::Predicate;
use crate::models::LogRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur while talking to a search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The backend could not be reached (connection failure, timeout, 5xx).
    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The scroll window lapsed before the cursor was used again.
    #[error("Search cursor expired before the next page was requested")]
    CursorExpired,

    /// A filter parameter could not be interpreted.
    #[error("Invalid value for {field}: {reason}")]
    InvalidFilterValue {
        /// The offending request parameter.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The unique id is not a usable index name.
    #[error("Invalid unique id '{0}'")]
    InvalidIndexName(String),

    /// The tenant index does not exist.
    #[error("Index '{0}' does not exist")]
    IndexNotFound(String),

    /// The request was cancelled before the result set was complete.
    #[error("Search was cancelled")]
    Cancelled,

    /// The request deadline passed before the result set was complete.
    #[error("Search deadline exceeded")]
    DeadlineExceeded,

    /// The backend answered with something we could not use.
    #[error("Unexpected search backend response: {0}")]
    Backend(String),
}

/// Opaque resume token returned by a backend.
///
/// Carries no meaning beyond being handed back verbatim to
/// [`SearchBackend::next`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(String);

impl PageCursor {
    /// Wraps a raw backend token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a paginated result set.
#[derive(Debug, Clone)]
pub struct Page {
    /// Records on this page, disjoint from every earlier page.
    pub records: Vec<LogRecord>,
    /// Where to resume.
    pub cursor: PageCursor,
}

/// Trait for cursor-paginated search backends.
///
/// Each call is an independent round-trip; the only state carried between
/// calls is the cursor value itself. Implementations must be thread-safe.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Returns true if the tenant index exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Runs `predicate` against `index` and returns the first page.
    ///
    /// The returned cursor stays valid for `scroll_window` after each call.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is missing or the backend fails.
    async fn query(
        &self,
        index: &str,
        predicate: &Predicate,
        page_size: usize,
        scroll_window: Duration,
    ) -> Result<Page, SearchError>;

    /// Fetches the page following `cursor`. An empty page ends the result set.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::CursorExpired`] if the scroll window lapsed, or
    /// another error if the backend fails.
    async fn next(&self, cursor: &PageCursor, scroll_window: Duration)
        -> Result<Page, SearchError>;

    /// Releases the server-side resources held by `cursor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the release.
    async fn release(&self, cursor: &PageCursor) -> Result<(), SearchError> {
        let _ = cursor;
        Ok(())
    }
}

/// Checks that a tenant unique id is usable as an index name.
///
/// # Errors
///
/// Returns [`SearchError::InvalidIndexName`] if the id is empty, longer than
/// 255 bytes, contains upper-case letters or reserved characters, starts with
/// `-`, `_` or `+`, or is `.` / `..`.
pub fn validate_index_name(unique_id: &str) -> Result<(), SearchError> {
    const RESERVED: &[char] = &[
        '\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' ', ':',
    ];

    let valid = !unique_id.is_empty()
        && unique_id.len() <= 255
        && unique_id != "."
        && unique_id != ".."
        && !unique_id.starts_with(['-', '_', '+'])
        && !unique_id.contains(RESERVED)
        && !unique_id.chars().any(|c| c.is_uppercase() || c.is_control());

    if valid {
        Ok(())
    } else {
        Err(SearchError::InvalidIndexName(unique_id.to_string()))
    }
}

#[derive(Debug)]
struct ScrollState {
    matches: Vec<LogRecord>,
    offset: usize,
    page_size: usize,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    indices: HashMap<String, Vec<LogRecord>>,
    scrolls: HashMap<String, ScrollState>,
    next_scroll_id: u64,
}

/// In-memory search backend.
///
/// Stores tenant indices in a `HashMap` protected by a `RwLock` and implements
/// real cursor semantics: page slicing, per-cursor expiry after the scroll
/// window, and release. Predicates are evaluated locally with
/// [`Predicate::matches`].
///
/// **Note:** Data is not persisted across restarts.
///
/// # Example
///
/// ```
/// use shared::models::LogRecord;
/// use shared::search::{InMemorySearchBackend, Predicate, SearchBackend};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let backend = InMemorySearchBackend::new();
/// backend.insert("shop-api", vec![LogRecord::new("Error", "boom", chrono::Utc::now())]).unwrap();
///
/// let page = backend
///     .query("shop-api", &Predicate::match_all(), 10, Duration::from_secs(60))
///     .await
///     .unwrap();
/// assert_eq!(page.records.len(), 1);
/// # });
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemorySearchBackend {
    inner: Arc<RwLock<Inner>>,
}

impl InMemorySearchBackend {
    /// Creates a backend with no indices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index, or leaves an existing one untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn create_index(&self, index: &str) -> Result<(), SearchError> {
        let mut inner = self.write()?;
        inner.indices.entry(index.to_string()).or_default();
        Ok(())
    }

    /// Appends records to an index, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn insert(&self, index: &str, records: Vec<LogRecord>) -> Result<(), SearchError> {
        let mut inner = self.write()?;
        inner
            .indices
            .entry(index.to_string())
            .or_default()
            .extend(records);
        Ok(())
    }

    /// Number of cursors that have not been released or exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn open_cursors(&self) -> Result<usize, SearchError> {
        Ok(self.read()?.scrolls.len())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, SearchError> {
        self.inner
            .read()
            .map_err(|_| SearchError::Backend("in-memory index lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, SearchError> {
        self.inner
            .write()
            .map_err(|_| SearchError::Backend("in-memory index lock poisoned".to_string()))
    }

    fn take_page(state: &mut ScrollState) -> Vec<LogRecord> {
        let end = (state.offset + state.page_size).min(state.matches.len());
        let records = state.matches[state.offset..end].to_vec();
        state.offset = end;
        records
    }
}

#[async_trait]
impl SearchBackend for InMemorySearchBackend {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        Ok(self.read()?.indices.contains_key(index))
    }

    async fn query(
        &self,
        index: &str,
        predicate: &Predicate,
        page_size: usize,
        scroll_window: Duration,
    ) -> Result<Page, SearchError> {
        let mut inner = self.write()?;

        let now = Instant::now();
        inner.scrolls.retain(|_, scroll| scroll.expires_at > now);

        let matches: Vec<LogRecord> = inner
            .indices
            .get(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?
            .iter()
            .filter(|record| predicate.matches(record))
            .cloned()
            .collect();

        let mut state = ScrollState {
            matches,
            offset: 0,
            page_size: page_size.max(1),
            expires_at: now + scroll_window,
        };
        let records = Self::take_page(&mut state);

        inner.next_scroll_id += 1;
        let cursor = PageCursor::new(format!("mem-{}", inner.next_scroll_id));
        inner.scrolls.insert(cursor.as_str().to_string(), state);

        Ok(Page { records, cursor })
    }

    async fn next(
        &self,
        cursor: &PageCursor,
        scroll_window: Duration,
    ) -> Result<Page, SearchError> {
        let mut inner = self.write()?;

        let state = inner
            .scrolls
            .get_mut(cursor.as_str())
            .ok_or(SearchError::CursorExpired)?;

        if Instant::now() >= state.expires_at {
            inner.scrolls.remove(cursor.as_str());
            return Err(SearchError::CursorExpired);
        }

        state.expires_at = Instant::now() + scroll_window;
        let records = Self::take_page(state);

        Ok(Page {
            records,
            cursor: cursor.clone(),
        })
    }

    async fn release(&self, cursor: &PageCursor) -> Result<(), SearchError> {
        self.write()?.scrolls.remove(cursor.as_str());
        Ok(())
    }
}
