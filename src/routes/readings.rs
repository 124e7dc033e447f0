use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use super::extract::{JsonBody, PathParam, QueryParams};
use super::{checked_limit, window_start, AppState};
use crate::error::{AppError, AppResult};
use crate::models::{Location, Measurements, PublicHealthData, SensorReadingOut};
use crate::payloads::{BulkSensorReading, PublicHealthDataCreate, SensorReadingCreate};
use crate::simulate::random_measurements;
use crate::store::{locations, readings};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/readings", post(create_reading).get(list_readings))
        .route("/readings/bulk", post(create_bulk))
        .route("/readings/latest", get(latest_readings))
        .route("/readings/stats", get(stats))
        .route("/readings/simulate", get(simulate))
        .route("/public-health", post(add_public_health))
        .route("/public-health/{zipcode}", get(get_public_health))
}

/// Handle `POST /readings`. Readings stored here are not evaluated for alerts.
async fn create_reading(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SensorReadingCreate>,
) -> AppResult<Json<SensorReadingOut>> {
    // ---
    payload.validate()?;
    let mut tx = state.pool.begin().await?;
    let out = store_reading(&mut tx, &payload).await?;
    tx.commit().await?;
    Ok(Json(out))
}

/// Handle `POST /readings/bulk`. All readings are stored or none are.
async fn create_bulk(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<BulkSensorReading>,
) -> AppResult<Json<Vec<SensorReadingOut>>> {
    // ---
    payload.validate()?;
    let mut tx = state.pool.begin().await?;
    let mut stored = Vec::with_capacity(payload.readings.len());
    for reading in &payload.readings {
        stored.push(store_reading(&mut tx, reading).await?);
    }
    tx.commit().await?;
    info!("POST /readings/bulk - stored {} readings", stored.len());
    Ok(Json(stored))
}

async fn store_reading(
    conn: &mut sqlx::PgConnection,
    payload: &SensorReadingCreate,
) -> Result<SensorReadingOut, sqlx::Error> {
    // ---
    // Borough is unknown on this path; existing locations keep theirs.
    let location = locations::get_or_create_location(conn, &payload.location_zipcode, "").await?;
    let timestamp = payload.timestamp.unwrap_or_else(Utc::now);
    let reading =
        readings::insert_reading(&mut *conn, location.id, timestamp, &payload.measurements()).await?;

    Ok(SensorReadingOut {
        id: reading.id,
        timestamp: reading.timestamp,
        pm25: reading.pm25,
        co2: reading.co2,
        tvoc: reading.tvoc,
        temperature: reading.temperature,
        humidity: reading.humidity,
        mold_risk: reading.mold_risk,
        location,
    })
}

fn default_list_limit() -> u32 {
    100
}

/// Query parameters for filtering sensor readings
#[derive(Debug, Deserialize)]
struct ReadingsQuery {
    location_zipcode: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    #[serde(default = "default_list_limit")]
    limit: u32,
}

/// Handle `GET /readings`.
async fn list_readings(
    QueryParams(params): QueryParams<ReadingsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SensorReadingOut>>> {
    // ---
    debug!("GET /readings - {:?}", params);
    let limit = checked_limit(params.limit, 1000)?;
    let rows = readings::list_readings(
        &state.pool,
        params.location_zipcode.as_deref(),
        params.start_time,
        params.end_time,
        limit,
    )
    .await?;
    Ok(Json(rows.into_iter().map(SensorReadingOut::from).collect()))
}

fn default_latest_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
struct LatestQuery {
    #[serde(default = "default_latest_limit")]
    limit: u32,
}

/// Handle `GET /readings/latest`: newest reading of each location.
async fn latest_readings(
    QueryParams(params): QueryParams<LatestQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SensorReadingOut>>> {
    // ---
    let limit = checked_limit(params.limit, 100)?;
    let rows = readings::latest_per_location(&state.pool, limit).await?;
    Ok(Json(rows.into_iter().map(SensorReadingOut::from).collect()))
}

fn default_window_hours() -> u32 {
    24
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    location_zipcode: Option<String>,
    #[serde(default = "default_window_hours")]
    time_window_hours: u32,
}

#[derive(Debug, Serialize)]
struct MetricStats {
    min: Option<f64>,
    max: Option<f64>,
    avg: Option<f64>,
    unit: &'static str,
}

#[derive(Debug, Serialize)]
struct LocationStats {
    location: Location,
    stats: BTreeMap<&'static str, MetricStats>,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    results: Vec<LocationStats>,
}

/// Handle `GET /readings/stats`: pm25/co2 statistics per location.
async fn stats(
    QueryParams(params): QueryParams<StatsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse>> {
    // ---
    let since = window_start("time_window_hours", params.time_window_hours)?;
    let rows =
        readings::location_stats(&state.pool, params.location_zipcode.as_deref(), since).await?;

    let table = state.evaluator.table();
    let unit = |key: &str| table.get(key).map(|r| r.unit).unwrap_or_default();

    let results = rows
        .into_iter()
        .map(|row| {
            let mut stats = BTreeMap::new();
            stats.insert(
                "pm25",
                MetricStats {
                    min: row.min_pm25,
                    max: row.max_pm25,
                    avg: row.avg_pm25,
                    unit: unit("pm25"),
                },
            );
            stats.insert(
                "co2",
                MetricStats {
                    min: row.min_co2,
                    max: row.max_co2,
                    avg: row.avg_co2,
                    unit: unit("co2"),
                },
            );
            LocationStats {
                location: row.location,
                stats,
                last_updated: row.last_updated,
            }
        })
        .collect();

    Ok(Json(StatsResponse { results }))
}

fn default_sim_zipcode() -> String {
    "10001".to_string()
}

fn default_sim_borough() -> String {
    "Manhattan".to_string()
}

#[derive(Debug, Deserialize)]
struct SimulateQuery {
    #[serde(default = "default_sim_zipcode")]
    zipcode: String,
    #[serde(default = "default_sim_borough")]
    borough: String,
}

#[derive(Debug, Serialize)]
struct SimulatedReading {
    location_zipcode: String,
    borough: String,
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    measurements: Measurements,
}

/// Handle `GET /readings/simulate`: a random reading, not stored.
async fn simulate(QueryParams(params): QueryParams<SimulateQuery>) -> Json<SimulatedReading> {
    // ---
    Json(SimulatedReading {
        location_zipcode: params.zipcode,
        borough: params.borough,
        timestamp: Utc::now(),
        measurements: random_measurements(&mut rand::rng()),
    })
}

/// Handle `POST /public-health`.
async fn add_public_health(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PublicHealthDataCreate>,
) -> AppResult<Json<PublicHealthData>> {
    // ---
    payload.validate()?;
    let mut tx = state.pool.begin().await?;
    let location = locations::get_or_create_location(&mut tx, &payload.location_zipcode, "").await?;
    let data = readings::insert_public_health(
        &mut *tx,
        location.id,
        payload.year,
        payload.asthma_rate,
        payload.emergency_visits,
    )
    .await?;
    tx.commit().await?;
    Ok(Json(data))
}

#[derive(Debug, Deserialize)]
struct PublicHealthQuery {
    year: Option<i32>,
}

/// Handle `GET /public-health/{zipcode}`.
async fn get_public_health(
    PathParam(zipcode): PathParam<String>,
    QueryParams(params): QueryParams<PublicHealthQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PublicHealthData>>> {
    // ---
    let location = locations::get_location(&state.pool, &zipcode)
        .await?
        .ok_or(AppError::NotFound("Location"))?;
    let data = readings::list_public_health(&state.pool, location.id, params.year).await?;
    Ok(Json(data))
}
