//! Per-severity record counts.

use crate::models::{DisplayLevel, LogRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of records per normalized severity.
///
/// Only levels that occur get an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeverityCounts(BTreeMap<DisplayLevel, usize>);

impl SeverityCounts {
    /// Counts records by their normalized level.
    #[must_use]
    pub fn from_records(records: &[LogRecord]) -> Self {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(record.display_level()).or_insert(0) += 1;
        }
        Self(counts)
    }

    /// Count for one level; zero if the level never occurred.
    #[must_use]
    pub fn get(&self, level: DisplayLevel) -> usize {
        self.0.get(&level).copied().unwrap_or(0)
    }

    /// Sum over all levels.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Iterates over `(level, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DisplayLevel, usize)> + '_ {
        self.0.iter().map(|(level, count)| (*level, *count))
    }
}
