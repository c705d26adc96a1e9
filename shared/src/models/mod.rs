//! Data models for the Logscope log retrieval service.
//!
//! This module contains the log record as stored in tenant indices, its display
//! projection, and the alert registration model.

pub mod alert;
pub mod log;

pub use alert::{AlertRecipient, Registration};
pub use log::{normalize, parse_timestamp, DisplayLevel, LogRecord, LogView};
