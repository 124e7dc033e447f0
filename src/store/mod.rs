//! Postgres persistence for locations, readings, alerts and households.
//!
//! Single-statement functions are generic over [`sqlx::PgExecutor`] so they
//! run against the pool or inside a caller's transaction. Functions issuing
//! several statements take `&mut PgConnection`.

pub mod alerts;
pub mod households;
pub mod locations;
pub mod readings;
