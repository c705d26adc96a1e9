//! Log retrieval service.
//!
//! Ties the search pieces together for each API operation: validate the tenant
//! id, compose the filter, drain the backend, order by timestamp, and hand the
//! result to the requested aggregation.

use crate::analytics::{daily_histogram, error_histogram, Histogram, SeverityCounts};
use crate::models::LogRecord;
use crate::search::{
    drain, validate_index_name, DrainOptions, FilterSpec, Predicate, SearchBackend, SearchError,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Retrieves and summarizes tenant log records.
///
/// Holds no per-request state, so a single instance can serve concurrent
/// requests.
#[derive(Clone)]
pub struct LogService {
    backend: Arc<dyn SearchBackend>,
    options: DrainOptions,
}

impl LogService {
    /// Creates a service over an injected backend handle.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>, options: DrainOptions) -> Self {
        Self { backend, options }
    }

    /// The drain settings applied to every retrieval.
    #[must_use]
    pub fn options(&self) -> DrainOptions {
        self.options
    }

    /// Returns true if the tenant's index exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is not a valid index name or the backend fails.
    pub async fn index_exists(&self, unique_id: &str) -> Result<bool, SearchError> {
        validate_index_name(unique_id)?;
        self.backend.index_exists(unique_id).await
    }

    /// Returns every record matching `filter`, ascending by timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid, the drain is cancelled or times
    /// out, or the backend fails.
    pub async fn search(
        &self,
        unique_id: &str,
        filter: &FilterSpec,
        cancel: &CancellationToken,
    ) -> Result<Vec<LogRecord>, SearchError> {
        self.retrieve(unique_id, &filter.to_predicate(), cancel)
            .await
    }

    /// Counts all records of the tenant per normalized severity.
    ///
    /// # Errors
    ///
    /// See [`LogService::search`].
    pub async fn severity_counts(
        &self,
        unique_id: &str,
        cancel: &CancellationToken,
    ) -> Result<SeverityCounts, SearchError> {
        let records = self
            .retrieve(unique_id, &Predicate::match_all(), cancel)
            .await?;
        Ok(SeverityCounts::from_records(&records))
    }

    /// Builds the per-day histogram over all records of the tenant.
    ///
    /// # Errors
    ///
    /// See [`LogService::search`].
    pub async fn daily_histogram(
        &self,
        unique_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Histogram, SearchError> {
        let records = self
            .retrieve(unique_id, &Predicate::match_all(), cancel)
            .await?;
        Ok(daily_histogram(&records))
    }

    /// Builds the 3-hour error histogram over all records of the tenant.
    ///
    /// # Errors
    ///
    /// See [`LogService::search`].
    pub async fn error_histogram(
        &self,
        unique_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Histogram, SearchError> {
        let records = self
            .retrieve(unique_id, &Predicate::match_all(), cancel)
            .await?;
        Ok(error_histogram(&records))
    }

    async fn retrieve(
        &self,
        unique_id: &str,
        predicate: &Predicate,
        cancel: &CancellationToken,
    ) -> Result<Vec<LogRecord>, SearchError> {
        validate_index_name(unique_id)?;

        let mut records = drain(
            self.backend.as_ref(),
            unique_id,
            predicate,
            self.options,
            cancel,
        )
        .await?;

        // Stable, so records sharing a timestamp keep their arrival order.
        records.sort_by_key(|record| record.timestamp);

        tracing::debug!(
            index = %unique_id,
            clauses = predicate.clauses().len(),
            count = records.len(),
            "Retrieved log records"
        );

        Ok(records)
    }
}
