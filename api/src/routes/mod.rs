//! API route definitions.
//!
//! This module organizes all HTTP routes for the Logscope API server.

mod alerts;
mod export;
mod health;
mod logs;
mod params;
mod visualisation;

pub use alerts::alerts_routes;
pub use export::export_routes;
pub use health::health_routes;
pub use logs::logs_routes;
pub use visualisation::visualisation_routes;
