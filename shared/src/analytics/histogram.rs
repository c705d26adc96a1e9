//! Time-bucketed histograms over a timestamp-ordered record set.
//!
//! Buckets are half-open `[start, end)` intervals of fixed width, anchored to
//! midnight UTC of the first record's day and laid out densely up to the last
//! record's timestamp. An empty record set yields an empty histogram.

use crate::models::LogRecord;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One bucket of a histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramBucket {
    /// Display label of the bucket.
    pub label: String,
    /// Inclusive start of the interval.
    pub start: DateTime<Utc>,
    /// Exclusive end of the interval.
    pub end: DateTime<Utc>,
    /// Number of counted records inside the interval.
    pub count: usize,
}

/// An ordered sequence of contiguous buckets.
///
/// Serializes as a JSON object whose keys are the bucket labels in
/// chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    buckets: Vec<HistogramBucket>,
}

impl Histogram {
    /// The buckets in chronological order.
    #[must_use]
    pub fn buckets(&self) -> &[HistogramBucket] {
        &self.buckets
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if there are no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of all bucket counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Looks up the count of the bucket with the given label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<usize> {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.count)
    }
}

impl Serialize for Histogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(&bucket.label, &bucket.count)?;
        }
        map.end()
    }
}

/// Builds a dense per-day histogram counting every record.
///
/// Labels are `dd-MM-yyyy`. `records` must be sorted ascending by timestamp.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use shared::analytics::daily_histogram;
/// use shared::models::LogRecord;
///
/// let records = vec![
///     LogRecord::new("Information", "a", Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
///     LogRecord::new("Information", "b", Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap()),
/// ];
///
/// let histogram = daily_histogram(&records);
/// assert_eq!(histogram.len(), 3);
/// assert_eq!(histogram.get("02-01-2024"), Some(0));
/// ```
#[must_use]
pub fn daily_histogram(records: &[LogRecord]) -> Histogram {
    build(
        records,
        Duration::days(1),
        |start, _| start.format("%d-%m-%Y").to_string(),
        |_| true,
    )
}

/// Builds a dense 3-hour histogram counting only error-severity records.
///
/// A record counts if its normalized level is `error`, which covers raw
/// `Error` and `Critical`. Labels are `dd-MM-yyyy HH:mm - dd-MM-yyyy HH:mm`.
/// `records` must be sorted ascending by timestamp.
#[must_use]
pub fn error_histogram(records: &[LogRecord]) -> Histogram {
    build(
        records,
        Duration::hours(3),
        |start, end| {
            format!(
                "{} - {}",
                start.format("%d-%m-%Y %H:%M"),
                end.format("%d-%m-%Y %H:%M")
            )
        },
        LogRecord::is_error,
    )
}

fn build<L, P>(records: &[LogRecord], width: Duration, label: L, counts: P) -> Histogram
where
    L: Fn(DateTime<Utc>, DateTime<Utc>) -> String,
    P: Fn(&LogRecord) -> bool,
{
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Histogram::default();
    };
    debug_assert!(
        records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
        "records must be sorted by timestamp"
    );

    let mut start = first
        .timestamp
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc();
    let mut remaining = records;
    let mut buckets = Vec::new();

    while start <= last.timestamp {
        let end = start + width;
        let split = remaining.partition_point(|r| r.timestamp < end);
        let (inside, rest) = remaining.split_at(split);

        buckets.push(HistogramBucket {
            label: label(start, end),
            start,
            end,
            count: inside.iter().filter(|&r| counts(r)).count(),
        });

        remaining = rest;
        start = end;
    }

    Histogram { buckets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn record(level: &str, timestamp: DateTime<Utc>) -> LogRecord {
        LogRecord::new(level, "msg", timestamp)
    }

    #[test]
    fn test_daily_scenario() {
        let records = vec![
            record("Information", at(2024, 1, 1, 10, 0)),
            record("Information", at(2024, 1, 1, 23, 59)),
            record("Error", at(2024, 1, 2, 0, 1)),
        ];

        let histogram = daily_histogram(&records);

        assert_eq!(histogram.len(), 2);
        assert_eq!(histogram.get("01-01-2024"), Some(2));
        assert_eq!(histogram.get("02-01-2024"), Some(1));
        assert_eq!(
            serde_json::to_string(&histogram).unwrap(),
            r#"{"01-01-2024":2,"02-01-2024":1}"#
        );
    }

    #[test]
    fn test_empty_input_yields_empty_histograms() {
        assert!(daily_histogram(&[]).is_empty());
        assert!(error_histogram(&[]).is_empty());
        assert_eq!(serde_json::to_string(&daily_histogram(&[])).unwrap(), "{}");
    }

    #[test]
    fn test_daily_buckets_are_dense() {
        let records = vec![
            record("Information", at(2024, 2, 27, 12, 0)),
            record("Information", at(2024, 3, 2, 1, 0)),
        ];

        let histogram = daily_histogram(&records);
        let labels: Vec<&str> = histogram.buckets().iter().map(|b| b.label.as_str()).collect();

        // 2024 is a leap year.
        assert_eq!(
            labels,
            [
                "27-02-2024",
                "28-02-2024",
                "29-02-2024",
                "01-03-2024",
                "02-03-2024"
            ]
        );
        assert_eq!(histogram.total(), 2);
    }

    #[test]
    fn test_buckets_are_contiguous_and_half_open() {
        let records = vec![
            record("Error", at(2024, 1, 1, 5, 0)),
            record("Error", at(2024, 1, 2, 0, 0)),
        ];

        let histogram = daily_histogram(&records);
        let buckets = histogram.buckets();

        assert_eq!(buckets[0].start, at(2024, 1, 1, 0, 0));
        assert_eq!(buckets[0].end, buckets[1].start);
        // A record exactly on a boundary belongs to the later bucket only.
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].count, 1);
    }

    #[test]
    fn test_single_record_at_midnight() {
        let histogram = daily_histogram(&[record("Debug", at(2024, 5, 1, 0, 0))]);

        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram.get("01-05-2024"), Some(1));
    }

    #[test]
    fn test_daily_total_equals_record_count() {
        let records: Vec<LogRecord> = (0..50)
            .map(|i| record("Information", at(2024, 1, 1, 0, 0) + Duration::minutes(i * 97)))
            .collect();

        let histogram = daily_histogram(&records);

        assert_eq!(histogram.total(), records.len());
    }

    #[test]
    fn test_error_histogram_counts_only_errors() {
        let records = vec![
            record("Error", at(2024, 1, 1, 0, 30)),
            record("Information", at(2024, 1, 1, 1, 0)),
            record("Critical", at(2024, 1, 1, 2, 59)),
            record("Warning", at(2024, 1, 1, 3, 0)),
            record("Error", at(2024, 1, 1, 7, 15)),
        ];

        let histogram = error_histogram(&records);

        assert_eq!(histogram.len(), 3);
        assert_eq!(histogram.get("01-01-2024 00:00 - 01-01-2024 03:00"), Some(2));
        assert_eq!(histogram.get("01-01-2024 03:00 - 01-01-2024 06:00"), Some(0));
        assert_eq!(histogram.get("01-01-2024 06:00 - 01-01-2024 09:00"), Some(1));
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn test_error_histogram_anchors_at_midnight() {
        let histogram = error_histogram(&[record("Error", at(2024, 1, 1, 22, 0))]);

        // Buckets start at midnight even though the first record is late in the day.
        assert_eq!(histogram.len(), 8);
        assert_eq!(histogram.buckets()[0].start, at(2024, 1, 1, 0, 0));
        assert_eq!(
            histogram.buckets()[7].label,
            "01-01-2024 21:00 - 02-01-2024 00:00"
        );
        assert_eq!(histogram.total(), 1);
    }

    #[test]
    fn test_error_histogram_without_errors_still_has_buckets() {
        let records = vec![
            record("Information", at(2024, 1, 1, 1, 0)),
            record("Debug", at(2024, 1, 1, 4, 0)),
        ];

        let histogram = error_histogram(&records);

        assert_eq!(histogram.len(), 2);
        assert_eq!(histogram.total(), 0);
    }

    #[test]
    fn test_serialization_preserves_chronological_order() {
        let records = vec![
            record("Information", at(2024, 1, 31, 12, 0)),
            record("Information", at(2024, 2, 1, 12, 0)),
        ];

        let json = serde_json::to_string(&daily_histogram(&records)).unwrap();

        // Lexical order would put "01-02-2024" first.
        assert_eq!(json, r#"{"31-01-2024":1,"01-02-2024":1}"#);
    }
}
