//! Search backend connection.
//!
//! Builds the search backend handle once at startup from the configured URL.
//! The handle is shared by every request through the `LogService`.

use crate::config::Config;
use anyhow::{Context, Result};
use shared::search::{
    ElasticsearchBackend, ElasticsearchConfig, InMemorySearchBackend, SearchBackend,
};
use std::sync::Arc;

/// Creates the search backend selected by `config.search_url`.
///
/// `memory://` yields an empty in-process backend. Any other URL is treated as
/// an Elasticsearch cluster, which is pinged once; an unreachable cluster is
/// logged but does not prevent startup, since requests report it per call.
///
/// # Errors
///
/// Returns an error if the URL cannot be used to build a client.
pub async fn connect(config: &Config) -> Result<Arc<dyn SearchBackend>> {
    if config.uses_memory_backend() {
        tracing::warn!("Using in-memory search backend; no records are persisted");
        return Ok(Arc::new(InMemorySearchBackend::new()));
    }

    let es_config = ElasticsearchConfig {
        url: config.search_url.clone(),
        request_timeout: config.search_timeout,
    };
    let backend = ElasticsearchBackend::new(&es_config)
        .with_context(|| format!("Invalid search backend URL '{}'", config.search_url))?;

    match backend.ping().await {
        Ok(()) => tracing::info!(url = %config.search_url, "Connected to search backend"),
        Err(e) => tracing::warn!(
            url = %config.search_url,
            error = %e,
            "Search backend is not reachable yet"
        ),
    }

    Ok(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let config = Config {
            search_url: "memory://".to_string(),
            ..Config::default()
        };

        let backend = connect(&config).await.unwrap();

        assert!(!backend.index_exists("shop-api").await.unwrap());
    }

    #[tokio::test]
    async fn test_connect_unreachable_backend_still_starts() {
        let config = Config {
            search_url: "http://127.0.0.1:1".to_string(),
            search_timeout: Duration::from_secs(1),
            ..Config::default()
        };

        let backend = connect(&config).await.unwrap();

        assert!(backend.index_exists("shop-api").await.is_err());
    }

    #[tokio::test]
    async fn test_connect_invalid_url() {
        let config = Config {
            search_url: "not a url".to_string(),
            ..Config::default()
        };

        assert!(connect(&config).await.is_err());
    }
}
