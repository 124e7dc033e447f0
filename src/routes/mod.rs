//! HTTP routes gateway.
//!
//! Each sibling module exports a subrouter; this module merges them, mounts
//! the API under `/api/v1`, and attaches the shared [`AppState`].

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::alerts::{AlertEvaluator, RecommendationResolver};
use crate::config::{MAX_WINDOW_HOURS, MIN_WINDOW_HOURS};
use crate::error::{AppError, AppResult};
use crate::Config;

mod alerts;
mod extract;
mod health;
mod households;
mod ingest;
mod readings;

// ---

/// State shared by every handler.
///
/// The evaluator and resolver are immutable, so handlers use them
/// concurrently without locking.
#[derive(Clone)]
pub struct AppState {
    // ---
    pub pool: PgPool,
    pub config: Config,
    pub evaluator: Arc<AlertEvaluator>,
    pub resolver: Arc<RecommendationResolver>,
}

impl AppState {
    // ---
    /// State with the standard threshold table and recommendation bundles.
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self::with_engine(pool, config, AlertEvaluator::default(), RecommendationResolver::default())
    }

    pub fn with_engine(
        pool: PgPool,
        config: Config,
        evaluator: AlertEvaluator,
        resolver: RecommendationResolver,
    ) -> Self {
        Self {
            pool,
            config,
            evaluator: Arc::new(evaluator),
            resolver: Arc::new(resolver),
        }
    }
}

pub fn router(state: AppState) -> Router {
    // ---
    let api = Router::new()
        .merge(ingest::router())
        .merge(alerts::router())
        .merge(readings::router())
        .merge(households::router());

    Router::new()
        .merge(health::router())
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---

/// Start of a look-back window of `hours`, which must lie in 1..=168.
fn window_start(name: &str, hours: u32) -> AppResult<DateTime<Utc>> {
    // ---
    if !(MIN_WINDOW_HOURS..=MAX_WINDOW_HOURS).contains(&hours) {
        return Err(AppError::InvalidParam(format!(
            "{name} must be between {MIN_WINDOW_HOURS} and {MAX_WINDOW_HOURS}, got {hours}"
        )));
    }
    Ok(Utc::now() - Duration::hours(i64::from(hours)))
}

/// Validate a `limit` query parameter against its maximum.
fn checked_limit(limit: u32, max: u32) -> AppResult<i64> {
    // ---
    if limit > max {
        return Err(AppError::InvalidParam(format!(
            "limit must be at most {max}, got {limit}"
        )));
    }
    Ok(i64::from(limit))
}
