//! Integration tests for the Logscope API.
//!
//! These tests drive the full router in-process against the in-memory search
//! backend.

mod common;

mod alerts_tests;
mod export_tests;
mod health_tests;
mod search_tests;
mod visualisation_tests;
