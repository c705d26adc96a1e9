//! Log data model.
//!
//! Defines the `LogRecord` structure as stored in a tenant index, the display
//! vocabulary records are normalized into, and the view returned to API callers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display severity vocabulary.
///
/// Raw severity labels stored in the backend are free-form; every label maps
/// onto exactly one of these values via [`normalize`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLevel {
    /// Informational records, and the fallback for unknown labels.
    #[default]
    Info,
    /// Debug records.
    Success,
    /// Warning records.
    Warning,
    /// Error and critical records.
    Error,
}

impl std::fmt::Display for DisplayLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Maps a raw severity label onto the display vocabulary.
///
/// The mapping is a fixed table compared case-insensitively:
///
/// | raw           | display   |
/// |---------------|-----------|
/// | `Information` | `info`    |
/// | `Debug`       | `success` |
/// | `Warning`     | `warning` |
/// | `Error`       | `error`   |
/// | `Critical`    | `error`   |
///
/// Any other label, including the empty string, folds into `info`.
///
/// # Example
///
/// ```
/// use shared::models::{normalize, DisplayLevel};
///
/// assert_eq!(normalize("Critical"), DisplayLevel::Error);
/// assert_eq!(normalize("Verbose"), DisplayLevel::Info);
/// ```
#[must_use]
pub fn normalize(raw_level: &str) -> DisplayLevel {
    const TABLE: [(&str, DisplayLevel); 5] = [
        ("information", DisplayLevel::Info),
        ("debug", DisplayLevel::Success),
        ("critical", DisplayLevel::Error),
        ("warning", DisplayLevel::Warning),
        ("error", DisplayLevel::Error),
    ];

    TABLE
        .iter()
        .find(|(label, _)| raw_level.eq_ignore_ascii_case(label))
        .map_or(DisplayLevel::Info, |(_, level)| *level)
}

/// A single log record as stored in a tenant index.
///
/// Field names follow the documents written by the log producers
/// (`level`, `message`, `timeStamp`, `callingFile`, `callingMethod`).
///
/// # Example
///
/// ```
/// use shared::models::LogRecord;
///
/// let json = r#"{"level":"Error","message":"boom","timeStamp":"2024-01-01T10:00:00"}"#;
/// let record: LogRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(record.level, "Error");
/// assert!(record.calling_file.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Raw severity label (e.g. `Information`, `Error`).
    #[serde(default)]
    pub level: String,

    /// The log message content.
    #[serde(default)]
    pub message: String,

    /// When the record was produced.
    #[serde(
        rename = "timeStamp",
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: DateTime<Utc>,

    /// Source file that produced the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_file: Option<String>,

    /// Method that produced the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_method: Option<String>,
}

impl LogRecord {
    /// Creates a record without origin annotations.
    #[must_use]
    pub fn new(
        level: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            level: level.into(),
            message: message.into(),
            timestamp,
            calling_file: None,
            calling_method: None,
        }
    }

    /// Sets the origin file and method annotations.
    #[must_use]
    pub fn with_origin(mut self, file: impl Into<String>, method: impl Into<String>) -> Self {
        self.calling_file = Some(file.into());
        self.calling_method = Some(method.into());
        self
    }

    /// Returns the normalized display level of this record.
    #[must_use]
    pub fn display_level(&self) -> DisplayLevel {
        normalize(&self.level)
    }

    /// Returns true if the record counts towards the error histogram.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.display_level() == DisplayLevel::Error
    }
}

/// A log record as presented to API callers.
///
/// Carries the normalized level for display alongside the raw label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogView {
    /// Normalized display level.
    pub level: DisplayLevel,
    /// Severity label exactly as stored.
    pub raw_level: String,
    /// The log message content.
    pub message: String,
    /// When the record was produced.
    #[serde(
        rename = "timeStamp",
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: DateTime<Utc>,
    /// Source file that produced the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_file: Option<String>,
    /// Method that produced the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_method: Option<String>,
}

impl From<LogRecord> for LogView {
    fn from(record: LogRecord) -> Self {
        Self {
            level: normalize(&record.level),
            raw_level: record.level,
            message: record.message,
            timestamp: record.timestamp,
            calling_file: record.calling_file,
            calling_method: record.calling_method,
        }
    }
}

/// Parses a timestamp in any of the accepted formats.
///
/// Accepts RFC 3339, naive ISO-8601 date-times with a `T` or a space separator
/// (optionally with fractional seconds), and bare dates (midnight). Naive values
/// are interpreted as UTC. Returns `None` if no format matches.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}
