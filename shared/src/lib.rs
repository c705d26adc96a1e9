//! Logscope Shared Library
//!
//! This crate contains the log retrieval core shared by the Logscope API
//! server and CLI.
//!
//! # Modules
//!
//! - [`models`] - Log records, severity normalization and alert recipients
//! - [`search`] - Search backends, filter composition and result draining
//! - [`analytics`] - Histograms and severity counts
//! - [`service`] - The `LogService` facade used by the API handlers
//! - [`alerts`] - Alert recipient lookup
//! - [`export`] - Document export of search results
//!
//! # Example
//!
//! ```
//! use shared::models::{normalize, DisplayLevel, LogRecord};
//! use shared::search::FilterSpec;
//! use chrono::Utc;
//!
//! let record = LogRecord::new("Critical", "disk full", Utc::now());
//! assert_eq!(normalize(&record.level), DisplayLevel::Error);
//!
//! let filter = FilterSpec::parse(Some("disk"), Some("Critical"), None, None).unwrap();
//! assert!(filter.to_predicate().matches(&record));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod alerts;
pub mod analytics;
pub mod export;
pub mod models;
pub mod search;
pub mod service;

pub use service::LogService;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use tokio_util;
pub use validator;
