use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::extract::QueryParams;
use super::{window_start, AppState};
use crate::error::AppResult;
use crate::models::AlertOut;
use crate::store::{alerts, readings};

// ---

const ALERTS_LIMIT: i64 = 200;

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/context", get(context))
        .route("/recommendations", get(recommendations))
}

fn default_window_hours() -> u32 {
    24
}

#[derive(Debug, Deserialize)]
struct AlertsQuery {
    zipcode: Option<String>,
    #[serde(default = "default_window_hours")]
    time_window_hours: u32,
}

#[derive(Debug, Serialize)]
struct AlertsResponse {
    count: usize,
    alerts: Vec<AlertOut>,
}

/// Handle `GET /alerts`: stored alerts in the window, newest first.
async fn list_alerts(
    QueryParams(params): QueryParams<AlertsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<AlertsResponse>> {
    // ---
    let since = window_start("time_window_hours", params.time_window_hours)?;
    let alerts = alerts::list_alerts(&state.pool, params.zipcode.as_deref(), since, ALERTS_LIMIT).await?;
    debug!("GET /alerts - {} alerts since {}", alerts.len(), since);

    Ok(Json(AlertsResponse {
        count: alerts.len(),
        alerts,
    }))
}

#[derive(Debug, Deserialize)]
struct ContextQuery {
    zipcode: Option<String>,
    year: Option<i32>,
}

/// Public health overlay for a zipcode.
#[derive(Debug, Serialize)]
struct Overlay {
    #[serde(rename = "type")]
    kind: &'static str,
    zipcode: String,
    year: Option<i32>,
    value: Option<f64>,
    meta: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ContextResponse {
    overlays: Vec<Overlay>,
}

/// Handle `GET /context`.
///
/// Overlay values are fixed placeholders; no public dataset is queried.
async fn context(QueryParams(params): QueryParams<ContextQuery>) -> Json<ContextResponse> {
    // ---
    let overlay = match params.zipcode {
        Some(zipcode) => Overlay {
            kind: "asthma_rate",
            zipcode,
            year: Some(params.year.unwrap_or(2023)),
            value: Some(18.3),
            meta: None,
        },
        None => Overlay {
            kind: "asthma_rate",
            zipcode: "10001".to_string(),
            year: Some(2023),
            value: Some(18.3),
            meta: None,
        },
    };
    Json(ContextResponse {
        overlays: vec![overlay],
    })
}

#[derive(Debug, Deserialize)]
struct RecommendationsQuery {
    zipcode: Option<String>,
}

#[derive(Debug, Serialize)]
struct RecommendationsResponse {
    status: &'static str,
    zipcode: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    actions: Option<Vec<String>>,
    reasons: Option<Vec<String>>,
}

/// Handle `GET /recommendations`: advice for the latest reading.
async fn recommendations(
    QueryParams(params): QueryParams<RecommendationsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<RecommendationsResponse>> {
    // ---
    let Some(latest) = readings::latest_for_zip(&state.pool, params.zipcode.as_deref()).await?
    else {
        return Ok(Json(RecommendationsResponse {
            status: "no data",
            zipcode: params.zipcode,
            timestamp: None,
            actions: None,
            reasons: None,
        }));
    };

    let triggered = state.evaluator.evaluate(&latest.reading.measurements());
    info!(
        "GET /recommendations - reading {} in {} triggered {} alerts",
        latest.reading.id,
        latest.zipcode,
        triggered.len()
    );

    if triggered.is_empty() {
        return Ok(Json(RecommendationsResponse {
            status: "no action needed",
            zipcode: Some(latest.zipcode),
            timestamp: Some(latest.reading.timestamp),
            actions: None,
            reasons: None,
        }));
    }

    let advice = state.resolver.advise(&triggered);
    Ok(Json(RecommendationsResponse {
        status: "action recommended",
        zipcode: Some(latest.zipcode),
        timestamp: Some(latest.reading.timestamp),
        actions: Some(advice.actions),
        reasons: Some(advice.reasons),
    }))
}
