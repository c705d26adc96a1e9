//! Search backends, filter composition and result draining.
//!
//! The `SearchBackend` trait abstracts a cursor-paginated full-text index. The
//! `ElasticsearchBackend` talks to a real cluster; the `InMemorySearchBackend`
//! serves development and tests.

pub mod backend;
pub mod drain;
pub mod elasticsearch;
pub mod filter;

pub use backend::{
    validate_index_name, InMemorySearchBackend, Page, PageCursor, SearchBackend, SearchError,
};
pub use drain::{drain, DrainOptions, DEFAULT_PAGE_SIZE, DEFAULT_SCROLL_WINDOW, MAX_PAGE_SIZE};
pub use elasticsearch::{to_query_dsl, ElasticsearchBackend, ElasticsearchConfig};
pub use filter::{Clause, FilterSpec, Predicate, ALL_LEVELS, FULL_TEXT_FIELDS};
