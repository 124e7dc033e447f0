use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgConnection;
use tracing::{debug, info};
use validator::Validate;

use super::extract::JsonBody;
use super::AppState;
use crate::alerts::TriggeredAlert;
use crate::error::{AppError, AppResult};
use crate::payloads::{HouseholdReadingCreate, IngestPayload};
use crate::store::{alerts, households, locations, readings};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/sensor-ingest", post(handler))
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    status: &'static str,
    reading_id: i32,
    alerts_created: usize,
    household_reading_id: Option<i64>,
    advice: Option<Vec<String>>,
    reasons: Option<Vec<String>>,
}

/// Store a reading, evaluate it, store its alerts and return advice.
///
/// All writes happen in one transaction.
async fn handler(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<IngestPayload>,
) -> AppResult<Json<IngestResponse>> {
    // ---
    payload.validate()?;
    info!(
        "POST /sensor-ingest - zipcode={} household_id={:?}",
        payload.zipcode, payload.household_id
    );

    let timestamp = payload.timestamp.unwrap_or_else(Utc::now);
    let measurements = payload.measurements();
    let triggered = state.evaluator.evaluate(&measurements);

    let mut tx = state.pool.begin().await?;

    // Step 1: location and reading
    let location =
        locations::get_or_create_location(&mut tx, &payload.zipcode, &payload.borough).await?;
    let reading = readings::insert_reading(&mut *tx, location.id, timestamp, &measurements).await?;

    // Step 2: general alert records
    for alert in &triggered {
        let alert_id = alerts::insert_alert(&mut *tx, location.id, Some(reading.id), alert).await?;
        debug!(
            "alert {} stored: {}={} threshold={} ({})",
            alert_id, alert.metric, alert.value, alert.threshold, alert.severity
        );
    }

    // Step 3: household mirror
    let household_reading_id = match payload.household_id {
        Some(household_id) => {
            Some(mirror_to_household(&mut tx, household_id, &payload, timestamp, &triggered).await?)
        }
        None => None,
    };

    tx.commit().await?;

    info!(
        "Ingested reading {} for {} with {} alerts (household reading {:?})",
        reading.id,
        location.zipcode,
        triggered.len(),
        household_reading_id
    );

    let advice = state.resolver.advise(&triggered);
    let (advice, reasons) = if advice.is_empty() {
        (None, None)
    } else {
        (Some(advice.actions), Some(advice.reasons))
    };

    Ok(Json(IngestResponse {
        status: "ok",
        reading_id: reading.id,
        alerts_created: triggered.len(),
        household_reading_id,
        advice,
        reasons,
    }))
}

/// Household copy of an ingested reading.
///
/// `tvoc` is stored as `voc`, `co2` is truncated to whole ppm, and the mold
/// flag is set when the mold rule fired.
fn household_reading(
    household_id: i64,
    payload: &IngestPayload,
    timestamp: DateTime<Utc>,
    triggered: &[TriggeredAlert],
) -> HouseholdReadingCreate {
    // ---
    HouseholdReadingCreate {
        household_id,
        device_id: None,
        timestamp: Some(timestamp),
        pm25: payload.pm25,
        co2: payload.co2.map(|v| v as i32),
        voc: payload.tvoc,
        humidity: payload.humidity,
        mold_flag: triggered.iter().any(|a| a.metric == "mold_risk"),
    }
}

/// Record the reading and one alert per triggered rule against a household.
async fn mirror_to_household(
    conn: &mut PgConnection,
    household_id: i64,
    payload: &IngestPayload,
    timestamp: DateTime<Utc>,
    triggered: &[TriggeredAlert],
) -> AppResult<i64> {
    // ---
    if households::get_household(&mut *conn, household_id).await?.is_none() {
        return Err(AppError::NotFound("Household"));
    }

    let new_reading = household_reading(household_id, payload, timestamp, triggered);
    let hh_reading = households::insert_reading(&mut *conn, &new_reading).await?;

    for alert in triggered {
        let event_type = alert.event_type();
        households::insert_alert(
            &mut *conn,
            household_id,
            &event_type,
            &alert.message,
            Some(hh_reading.reading_id),
            None,
        )
        .await?;
        debug!("household {} alert {}", household_id, event_type);
    }

    Ok(hh_reading.reading_id)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::alerts::AlertEvaluator;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(body: serde_json::Value) -> IngestPayload {
        serde_json::from_value(body).unwrap()
    }

    fn mirrored(body: serde_json::Value) -> HouseholdReadingCreate {
        let payload = payload(body);
        let triggered = AlertEvaluator::default().evaluate(&payload.measurements());
        let ts = Utc.with_ymd_and_hms(2025, 9, 27, 12, 0, 0).unwrap();
        household_reading(42, &payload, ts, &triggered)
    }

    #[test]
    fn co2_is_truncated_to_whole_ppm() {
        // ---
        let reading = mirrored(json!({
            "zipcode": "10001", "borough": "Manhattan", "co2": 1300.7,
        }));
        assert_eq!(reading.co2, Some(1300));
        assert_eq!(reading.household_id, 42);
        assert_eq!(
            reading.timestamp,
            Some(Utc.with_ymd_and_hms(2025, 9, 27, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn tvoc_is_stored_as_voc() {
        // ---
        let reading = mirrored(json!({
            "zipcode": "10001", "borough": "Manhattan",
            "pm25": 12.5, "tvoc": 250.0, "humidity": 41.0,
        }));
        assert_eq!(reading.voc, Some(250.0));
        assert_eq!(reading.pm25, Some(12.5));
        assert_eq!(reading.humidity, Some(41.0));
        assert_eq!(reading.co2, None);
        assert!(reading.device_id.is_none());
    }

    #[test]
    fn mold_flag_follows_mold_rule() {
        // ---
        let at_limit = mirrored(json!({
            "zipcode": "10001", "borough": "Manhattan", "mold_risk": 0.6,
        }));
        assert!(at_limit.mold_flag);

        let below = mirrored(json!({
            "zipcode": "10001", "borough": "Manhattan", "mold_risk": 0.59,
        }));
        assert!(!below.mold_flag);

        let absent = mirrored(json!({
            "zipcode": "10001", "borough": "Manhattan", "pm25": 80.0,
        }));
        assert!(!absent.mold_flag);
    }

    #[test]
    fn household_alerts_carry_event_types() {
        // ---
        let payload = payload(json!({
            "zipcode": "10001", "borough": "Manhattan",
            "co2": 1300.0, "humidity": 25.0, "mold_risk": 0.7,
        }));
        let triggered = AlertEvaluator::default().evaluate(&payload.measurements());
        let kinds: Vec<_> = triggered.iter().map(|a| a.event_type()).collect();
        assert_eq!(kinds, ["co2_high", "humidity_low", "mold_risk_high"]);
    }
}
