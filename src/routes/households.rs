use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use super::extract::{JsonBody, PathParam, QueryParams};
use super::{checked_limit, window_start, AppState};
use crate::aggregation::{zip_trends, ZipTrendSummary};
use crate::error::{AppError, AppResult};
use crate::models::{HealthContext, Household, HouseholdAlert, HouseholdReading};
use crate::payloads::{
    HealthContextUpsert, HouseholdAlertCreate, HouseholdCreate, HouseholdReadingCreate,
};
use crate::store::households;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/households", post(create_household).get(households_by_zip))
        .route("/households/{household_id}", get(get_household))
        .route(
            "/households/{household_id}/readings",
            post(add_reading).get(list_readings),
        )
        .route(
            "/households/{household_id}/alerts",
            post(add_alert).get(list_alerts),
        )
        .route("/health-context", put(upsert_health_context))
        .route("/health-context/{zipcode}", get(get_health_context))
        .route("/aggregations/zip-trends", get(zip_trends_handler))
        .route("/context/refresh", post(refresh_context))
}

async fn require_household(state: &AppState, household_id: i64) -> AppResult<Household> {
    // ---
    households::get_household(&state.pool, household_id)
        .await?
        .ok_or(AppError::NotFound("Household"))
}

fn check_path_id(path_id: i64, body_id: i64) -> AppResult<()> {
    // ---
    if path_id != body_id {
        return Err(AppError::BadRequest(format!(
            "household_id mismatch: path has {path_id}, body has {body_id}"
        )));
    }
    Ok(())
}

/// Handle `POST /households`.
async fn create_household(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<HouseholdCreate>,
) -> AppResult<Json<Household>> {
    // ---
    payload.validate()?;
    let household = households::create_household(&state.pool, &payload).await?;
    info!(
        "POST /households - created {} in {}",
        household.household_id, household.zipcode
    );
    Ok(Json(household))
}

/// Handle `GET /households/{household_id}`.
async fn get_household(
    PathParam(household_id): PathParam<i64>,
    State(state): State<AppState>,
) -> AppResult<Json<Household>> {
    // ---
    Ok(Json(require_household(&state, household_id).await?))
}

fn default_zipcode() -> String {
    "10001".to_string()
}

fn default_household_limit() -> u32 {
    100
}

#[derive(Debug, Deserialize)]
struct ByZipQuery {
    #[serde(default = "default_zipcode")]
    zipcode: String,
    #[serde(default = "default_household_limit")]
    limit: u32,
}

/// Handle `GET /households?zipcode=`.
async fn households_by_zip(
    QueryParams(params): QueryParams<ByZipQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Household>>> {
    // ---
    let limit = checked_limit(params.limit, 100)?;
    let rows = households::households_by_zip(&state.pool, &params.zipcode, limit).await?;
    Ok(Json(rows))
}

/// Handle `POST /households/{household_id}/readings`.
async fn add_reading(
    PathParam(household_id): PathParam<i64>,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<HouseholdReadingCreate>,
) -> AppResult<Json<HouseholdReading>> {
    // ---
    check_path_id(household_id, payload.household_id)?;
    payload.validate()?;
    require_household(&state, household_id).await?;
    let reading = households::insert_reading(&state.pool, &payload).await?;
    Ok(Json(reading))
}

fn default_reading_limit() -> u32 {
    50
}

#[derive(Debug, Deserialize)]
struct ReadingsQuery {
    #[serde(default = "default_reading_limit")]
    limit: u32,
}

/// Handle `GET /households/{household_id}/readings`.
///
/// Returns the latest readings across every household sharing the
/// household's zipcode.
async fn list_readings(
    PathParam(household_id): PathParam<i64>,
    QueryParams(params): QueryParams<ReadingsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<HouseholdReading>>> {
    // ---
    let limit = checked_limit(params.limit, 500)?;
    let household = require_household(&state, household_id).await?;
    let rows = households::latest_readings_for_zip(&state.pool, &household.zipcode, limit).await?;
    debug!(
        "GET /households/{}/readings - {} rows from {}",
        household_id,
        rows.len(),
        household.zipcode
    );
    Ok(Json(rows))
}

/// Handle `POST /households/{household_id}/alerts`.
async fn add_alert(
    PathParam(household_id): PathParam<i64>,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<HouseholdAlertCreate>,
) -> AppResult<Json<HouseholdAlert>> {
    // ---
    check_path_id(household_id, payload.household_id)?;
    payload.validate()?;
    require_household(&state, household_id).await?;
    let alert = households::insert_alert(
        &state.pool,
        household_id,
        &payload.event_type,
        &payload.alert_message,
        payload.reading_id,
        payload.timestamp,
    )
    .await?;
    Ok(Json(alert))
}

fn default_hours_back() -> u32 {
    24
}

fn default_alert_limit() -> u32 {
    200
}

#[derive(Debug, Deserialize)]
struct AlertsQuery {
    #[serde(default = "default_hours_back")]
    hours_back: u32,
    #[serde(default = "default_alert_limit")]
    limit: u32,
}

/// Handle `GET /households/{household_id}/alerts`.
async fn list_alerts(
    PathParam(household_id): PathParam<i64>,
    QueryParams(params): QueryParams<AlertsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<HouseholdAlert>>> {
    // ---
    let since = window_start("hours_back", params.hours_back)?;
    let limit = checked_limit(params.limit, 1000)?;
    let rows = households::alerts_for_household(&state.pool, household_id, since, limit).await?;
    Ok(Json(rows))
}

/// Handle `PUT /health-context`.
async fn upsert_health_context(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<HealthContextUpsert>,
) -> AppResult<Json<HealthContext>> {
    // ---
    payload.validate()?;
    let ctx = HealthContext {
        zipcode: payload.zipcode,
        asthma_rate: payload.asthma_rate,
        er_visit_rate: payload.er_visit_rate,
        ej_index: payload.ej_index,
    };
    Ok(Json(households::upsert_health_context(&state.pool, &ctx).await?))
}

/// Handle `GET /health-context/{zipcode}`.
async fn get_health_context(
    PathParam(zipcode): PathParam<String>,
    State(state): State<AppState>,
) -> AppResult<Json<HealthContext>> {
    // ---
    households::get_health_context(&state.pool, &zipcode)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Health context"))
}

#[derive(Debug, Deserialize)]
struct ZipTrendsQuery {
    hours_back: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ZipTrendsResponse {
    results: Vec<ZipTrendSummary>,
}

/// Handle `GET /aggregations/zip-trends`.
async fn zip_trends_handler(
    QueryParams(params): QueryParams<ZipTrendsQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<ZipTrendsResponse>> {
    // ---
    let hours = params
        .hours_back
        .unwrap_or(state.config.zip_trends_default_hours);
    let since = window_start("hours_back", hours)?;
    let rows = households::zip_reading_rows(&state.pool, since).await?;
    let results = zip_trends(rows, since);
    debug!("GET /aggregations/zip-trends - {} zipcodes", results.len());
    Ok(Json(ZipTrendsResponse { results }))
}

#[derive(Debug, Deserialize)]
struct RefreshQuery {
    zipcode: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    status: &'static str,
    updated: Vec<String>,
}

/// Handle `POST /context/refresh`.
///
/// Writes fixed placeholder values for one zipcode, or for every zipcode
/// with a household when none is given.
async fn refresh_context(
    QueryParams(params): QueryParams<RefreshQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<RefreshResponse>> {
    // ---
    let zipcodes = match params.zipcode {
        Some(zipcode) => vec![zipcode],
        None => households::household_zipcodes(&state.pool).await?,
    };

    let mut tx = state.pool.begin().await?;
    for zipcode in &zipcodes {
        let ctx = HealthContext {
            zipcode: zipcode.clone(),
            asthma_rate: Some(18.3),
            er_visit_rate: Some(22.7),
            ej_index: Some(0.63),
        };
        households::upsert_health_context(&mut *tx, &ctx).await?;
    }
    tx.commit().await?;

    info!("POST /context/refresh - {} zipcodes updated", zipcodes.len());
    Ok(Json(RefreshResponse {
        status: "ok",
        updated: zipcodes,
    }))
}
