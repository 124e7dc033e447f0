// src/routes/health.rs
//! Liveness and welcome endpoints for the air quality service.
//!
//! `/health` is used by container orchestrators and CI pipelines to verify
//! that the service is running and able to respond to HTTP requests; `/`
//! points API users at the versioned routes. Both live outside `/api/v1`.
//! Following the Explicit Module Boundary Pattern (EMBP), this file exports a
//! single subrouter to the gateway (`mod.rs`).

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    api: &'static str,
    version: &'static str,
}

/// Handle `GET /health`.
///
/// Does not touch the database or other external services.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Handle `GET /`.
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to the NYC Indoor Air Quality API",
        api: "/api/v1",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create a subrouter containing the `/` and `/health` routes.
///
/// This router is generic over the application state so it can merge cleanly
/// with the gateway router regardless of the state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}
