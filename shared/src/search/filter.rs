//! Filter composition.
//!
//! Turns the optional request filters (free-text term, level selector, date
//! range) into a single [`Predicate`]: a conjunction of whichever clauses are
//! present, or "match all" when none are.

use super::backend::SearchError;
use crate::models::{parse_timestamp, LogRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Level selector value meaning "no level filter".
pub const ALL_LEVELS: &str = "All";

/// Document fields searched by the free-text clause.
pub const FULL_TEXT_FIELDS: [&str; 5] = [
    "level",
    "message",
    "timeStamp",
    "callingMethod",
    "callingFile",
];

/// Request filters, parsed and validated.
///
/// Constructed once per request and never mutated afterwards.
///
/// # Example
///
/// ```
/// use shared::search::FilterSpec;
///
/// let filter = FilterSpec::parse(Some("timeout"), Some("Error"), Some("2024-01-01"), None).unwrap();
/// assert_eq!(filter.to_predicate().clauses().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Free-text term, if any.
    pub term: Option<String>,
    /// Level selector, if any. `All` is normalized away to `None`.
    pub level: Option<String>,
    /// Inclusive lower bound on the record timestamp.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the record timestamp.
    pub to: Option<DateTime<Utc>>,
}

impl FilterSpec {
    /// Creates an empty filter (matches every record).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw request parameters into a filter.
    ///
    /// Empty strings are treated as absent. The `All` level selector means no
    /// level filter.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilterValue`] if:
    /// - `from` or `to` is not a recognizable date or date-time
    /// - `from` is later than `to`
    pub fn parse(
        term: Option<&str>,
        level: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, SearchError> {
        let from = non_empty(from)
            .map(|raw| parse_bound("fromDate", raw))
            .transpose()?;
        let to = non_empty(to).map(|raw| parse_bound("toDate", raw)).transpose()?;

        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(SearchError::InvalidFilterValue {
                    field: "fromDate",
                    reason: format!("{from} is after toDate {to}"),
                });
            }
        }

        Ok(Self {
            term: non_empty(term).map(str::to_string),
            level: non_empty(level)
                .filter(|level| *level != ALL_LEVELS)
                .map(str::to_string),
            from,
            to,
        })
    }

    /// Sets the free-text term.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Sets the level selector.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Sets the date range; either bound may be open.
    #[must_use]
    pub fn with_range(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Composes the filter into a backend predicate.
    #[must_use]
    pub fn to_predicate(&self) -> Predicate {
        let mut clauses = Vec::new();

        if let Some(term) = self.term.as_deref().filter(|t| !t.is_empty()) {
            clauses.push(Clause::FullText {
                term: term.to_string(),
            });
        }

        if let Some(level) = self.level.as_deref().filter(|l| *l != ALL_LEVELS) {
            clauses.push(Clause::Level {
                value: level.to_lowercase(),
            });
        }

        if self.from.is_some() || self.to.is_some() {
            clauses.push(Clause::TimeRange {
                from: self.from,
                to: self.to,
            });
        }

        Predicate { clauses }
    }
}

/// A single sub-predicate of a composed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    /// Fuzzy substring match of the term against [`FULL_TEXT_FIELDS`].
    FullText {
        /// The unescaped search term.
        term: String,
    },
    /// Exact match on the lower-cased severity field.
    Level {
        /// Lower-cased level value.
        value: String,
    },
    /// Inclusive timestamp range; either end may be open.
    TimeRange {
        /// Lower bound (`>=`).
        from: Option<DateTime<Utc>>,
        /// Upper bound (`<=`).
        to: Option<DateTime<Utc>>,
    },
}

impl Clause {
    /// Evaluates the clause against a record locally.
    ///
    /// Full-text matching here is a case-insensitive substring test; the
    /// remote index additionally tolerates misspellings.
    #[must_use]
    pub fn matches(&self, record: &LogRecord) -> bool {
        match self {
            Self::FullText { term } => {
                let needle = term.to_lowercase();
                let timestamp = record.timestamp.to_rfc3339();
                let matched = [
                    Some(record.level.as_str()),
                    Some(record.message.as_str()),
                    Some(timestamp.as_str()),
                    record.calling_method.as_deref(),
                    record.calling_file.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle));
                matched
            }
            Self::Level { value } => record.level.to_lowercase() == *value,
            Self::TimeRange { from, to } => {
                from.map_or(true, |from| record.timestamp >= from)
                    && to.map_or(true, |to| record.timestamp <= to)
            }
        }
    }
}

/// A composed, immutable query predicate.
///
/// Clauses are combined with logical AND. A predicate without clauses matches
/// every record in the target index. The same predicate can be executed any
/// number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// A predicate matching every record.
    #[must_use]
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Returns true if the predicate has no clauses.
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The conjunctive clauses of this predicate.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Evaluates the predicate against a record locally.
    #[must_use]
    pub fn matches(&self, record: &LogRecord) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(field: &'static str, raw: &str) -> Result<DateTime<Utc>, SearchError> {
    parse_timestamp(raw).ok_or_else(|| SearchError::InvalidFilterValue {
        field,
        reason: format!("'{raw}' is not a valid date"),
    })
}
