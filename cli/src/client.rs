//! HTTP client for the Logscope API.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::models::{AlertRecipient, LogView};
use std::collections::BTreeMap;

/// Optional filters of a search.
#[derive(Debug, Default, Clone)]
pub struct SearchFilters {
    pub term: Option<String>,
    pub level: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    exists: bool,
}

/// A thin client over the `/api` routes.
///
/// Every call returns the raw body alongside the decoded value so `--json`
/// can print exactly what the server sent.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("logscope-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<(String, serde_json::Value)> {
        self.get("/health", &[]).await
    }

    /// `GET /api/checkUniqueId`.
    pub async fn check(&self, unique_id: &str) -> Result<(String, bool)> {
        let (raw, body): (String, ExistsResponse) = self
            .get("/api/checkUniqueId", &[("uniqueId", unique_id)])
            .await?;
        Ok((raw, body.exists))
    }

    /// `GET /api/searchTest`.
    pub async fn search(
        &self,
        unique_id: &str,
        filters: &SearchFilters,
    ) -> Result<(String, Vec<LogView>)> {
        let mut query = vec![("uniqueId", unique_id)];
        let optional = [
            ("searchTerm", &filters.term),
            ("type", &filters.level),
            ("fromDate", &filters.from),
            ("toDate", &filters.to),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                query.push((name, value.as_str()));
            }
        }
        self.get("/api/searchTest", &query).await
    }

    /// `GET /api/visualisationLogs`.
    pub async fn levels(&self, unique_id: &str) -> Result<(String, BTreeMap<String, u64>)> {
        self.get("/api/visualisationLogs", &[("uniqueId", unique_id)])
            .await
    }

    /// `GET /api/visualisationLogsForLineGraph` or, with `errors`, the 3-hour
    /// error histogram.
    pub async fn histogram(
        &self,
        unique_id: &str,
        errors: bool,
    ) -> Result<(String, BTreeMap<String, u64>)> {
        let path = if errors {
            "/api/visualisationLogsForLineGraphError"
        } else {
            "/api/visualisationLogsForLineGraph"
        };
        self.get(path, &[("uniqueId", unique_id)]).await
    }

    /// `GET /api/alerts`.
    pub async fn alerts(&self, unique_id: &str) -> Result<(String, Vec<AlertRecipient>)> {
        self.get("/api/alerts", &[("uniqueId", unique_id)]).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<(String, T)> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "Sending request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            match serde_json::from_str::<ErrorBody>(&raw) {
                Ok(body) => bail!("{status}: {} ({})", body.message, body.error),
                Err(_) => bail!("{status}: {raw}"),
            }
        }

        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Unexpected response from {url}"))?;
        Ok((raw, value))
    }
}
