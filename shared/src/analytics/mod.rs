//! Aggregations over retrieved log records.
//!
//! Histograms bucket a timestamp-ordered record set into fixed-width intervals;
//! severity counts tally records per display level.

pub mod histogram;
pub mod severity;

pub use histogram::{daily_histogram, error_histogram, Histogram, HistogramBucket};
pub use severity::SeverityCounts;
