//! Indoor air quality ingestion, alerting and zip-level trend service.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so integration tests can drive the alert engine and the HTTP
//! router directly.

pub mod aggregation;
pub mod alerts;
pub mod config;
pub mod error;
pub mod models;
pub mod payloads;
pub mod routes;
pub mod schema;
pub mod simulate;
pub mod store;

pub use config::Config;
pub use routes::{router, AppState};
