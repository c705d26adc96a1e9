//! Elasticsearch-backed search backend.
//!
//! Talks to the scroll API over HTTP: the first page comes from
//! `POST /{index}/_search?scroll=..`, following pages from
//! `POST /_search/scroll`, and cursors are released with
//! `DELETE /_search/scroll`.

use super::backend::{Page, PageCursor, SearchBackend, SearchError};
use super::filter::{Clause, Predicate, FULL_TEXT_FIELDS};
use crate::models::LogRecord;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Connection settings for an Elasticsearch cluster.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster (e.g., <http://localhost:9200>).
    pub url: String,
    /// Timeout applied to every round-trip.
    pub request_timeout: Duration,
}

impl ElasticsearchConfig {
    /// Creates a configuration with a 10 second round-trip timeout.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Search backend for an Elasticsearch cluster.
///
/// Holds a pooled `reqwest::Client`; cloning is cheap and clones share the pool.
#[derive(Debug, Clone)]
pub struct ElasticsearchBackend {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ScrollResponse {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: LogRecord,
}

impl ElasticsearchBackend {
    /// Creates a backend for the configured cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or the HTTP client cannot
    /// be built.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, SearchError> {
        let mut base_url = Url::parse(&config.url).map_err(|e| {
            SearchError::Backend(format!("invalid search URL '{}': {e}", config.url))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchError::Backend(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    /// Checks that the cluster answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster cannot be reached or reports a failure.
    pub async fn ping(&self) -> Result<(), SearchError> {
        let response = self
            .http
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(failure(response, None).await)
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, SearchError> {
        self.base_url
            .join(path)
            .map_err(|e| SearchError::Backend(format!("invalid endpoint '{path}': {e}")))
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let url = self.endpoint(index)?;
        let response = self.http.head(url).send().await.map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(failure(response, Some(index)).await),
        }
    }

    async fn query(
        &self,
        index: &str,
        predicate: &Predicate,
        page_size: usize,
        scroll_window: Duration,
    ) -> Result<Page, SearchError> {
        let mut url = self.endpoint(&format!("{index}/_search"))?;
        url.query_pairs_mut()
            .append_pair("scroll", &keep_alive(scroll_window));

        let body = json!({
            "size": page_size,
            "query": to_query_dsl(predicate),
            "sort": ["_doc"],
        });

        tracing::debug!(index = %index, page_size, "Opening search cursor");

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        decode_page(response, Some(index)).await
    }

    async fn next(
        &self,
        cursor: &PageCursor,
        scroll_window: Duration,
    ) -> Result<Page, SearchError> {
        let url = self.endpoint("_search/scroll")?;
        let body = json!({
            "scroll": keep_alive(scroll_window),
            "scroll_id": cursor.as_str(),
        });

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        decode_page(response, None).await
    }

    async fn release(&self, cursor: &PageCursor) -> Result<(), SearchError> {
        let url = self.endpoint("_search/scroll")?;
        let response = self
            .http
            .delete(url)
            .json(&json!({ "scroll_id": [cursor.as_str()] }))
            .send()
            .await
            .map_err(transport_error)?;

        // 404 means the context is already gone, which is what we wanted.
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(failure(response, None).await)
        }
    }
}

/// Translates a predicate into Elasticsearch query DSL.
///
/// A predicate without clauses becomes `match_all`; otherwise every clause is
/// placed in the `must` list of a `bool` query.
///
/// # Example
///
/// ```
/// use shared::search::{to_query_dsl, Predicate};
///
/// assert_eq!(to_query_dsl(&Predicate::match_all()), serde_json::json!({"match_all": {}}));
/// ```
#[must_use]
pub fn to_query_dsl(predicate: &Predicate) -> Value {
    if predicate.is_match_all() {
        return json!({ "match_all": {} });
    }

    let must: Vec<Value> = predicate
        .clauses()
        .iter()
        .map(|clause| match clause {
            Clause::FullText { term } => json!({
                "query_string": {
                    "fields": FULL_TEXT_FIELDS,
                    "query": format!("*{}*", escape_query_string(term)),
                    "fuzziness": "AUTO",
                    "lenient": true,
                }
            }),
            Clause::Level { value } => json!({
                "terms": { "level": [value] }
            }),
            Clause::TimeRange { from, to } => {
                let mut range = serde_json::Map::new();
                if let Some(from) = from {
                    range.insert("gte".to_string(), json!(from.to_rfc3339()));
                }
                if let Some(to) = to {
                    range.insert("lte".to_string(), json!(to.to_rfc3339()));
                }
                json!({ "range": { "timeStamp": range } })
            }
        })
        .collect();

    json!({ "bool": { "must": must } })
}

/// Escapes `query_string` reserved characters so the term is matched literally.
///
/// `<` and `>` cannot be escaped and are dropped.
fn escape_query_string(term: &str) -> String {
    const RESERVED: &[char] = &[
        '+', '-', '=', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':',
        '\\', '/',
    ];

    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '<' || c == '>' {
            continue;
        }
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn keep_alive(scroll_window: Duration) -> String {
    format!("{}s", scroll_window.as_secs().max(1))
}

fn transport_error(e: reqwest::Error) -> SearchError {
    if e.is_decode() {
        SearchError::Backend(e.to_string())
    } else {
        SearchError::BackendUnavailable(e.to_string())
    }
}

async fn decode_page(response: reqwest::Response, index: Option<&str>) -> Result<Page, SearchError> {
    if !response.status().is_success() {
        return Err(failure(response, index).await);
    }

    let body: ScrollResponse = response.json().await.map_err(transport_error)?;
    let cursor = body
        .scroll_id
        .map(PageCursor::new)
        .ok_or_else(|| SearchError::Backend("response carried no scroll id".to_string()))?;

    Ok(Page {
        records: body.hits.hits.into_iter().map(|hit| hit.source).collect(),
        cursor,
    })
}

/// Classifies a non-success response.
async fn failure(response: reqwest::Response, index: Option<&str>) -> SearchError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::NOT_FOUND && body.contains("search_context_missing_exception") {
        return SearchError::CursorExpired;
    }
    if status == StatusCode::NOT_FOUND && body.contains("index_not_found_exception") {
        return SearchError::IndexNotFound(index.unwrap_or_default().to_string());
    }
    if status.is_server_error() {
        return SearchError::BackendUnavailable(format!("{status}: {body}"));
    }

    SearchError::Backend(format!("{status}: {body}"))
}
