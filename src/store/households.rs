use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::aggregation::ZipReadingRow;
use crate::models::{HealthContext, Household, HouseholdAlert, HouseholdReading};
use crate::payloads::{HouseholdCreate, HouseholdReadingCreate};

// ---

const HOUSEHOLD_COLUMNS: &str =
    "household_id, address, zipcode, housing_type, risk_score, created_at, updated_at";

const READING_COLUMNS: &str =
    "reading_id, household_id, device_id, timestamp, pm25, co2, voc, humidity, mold_flag";

const ALERT_COLUMNS: &str =
    "alert_id, reading_id, household_id, event_type, alert_message, timestamp";

pub async fn create_household<'e, E>(exec: E, new: &HouseholdCreate) -> Result<Household, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = format!(
        r#"INSERT INTO households (address, zipcode, housing_type, risk_score)
           VALUES ($1, $2, $3, $4)
           RETURNING {HOUSEHOLD_COLUMNS}"#
    );
    sqlx::query_as::<_, Household>(&sql)
        .bind(&new.address)
        .bind(&new.zipcode)
        .bind(&new.housing_type)
        .bind(new.risk_score)
        .fetch_one(exec)
        .await
}

pub async fn get_household<'e, E>(exec: E, household_id: i64) -> Result<Option<Household>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = format!("SELECT {HOUSEHOLD_COLUMNS} FROM households WHERE household_id = $1");
    sqlx::query_as::<_, Household>(&sql)
        .bind(household_id)
        .fetch_optional(exec)
        .await
}

pub async fn households_by_zip<'e, E>(
    exec: E,
    zipcode: &str,
    limit: i64,
) -> Result<Vec<Household>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = format!(
        "SELECT {HOUSEHOLD_COLUMNS} FROM households WHERE zipcode = $1 ORDER BY household_id LIMIT $2"
    );
    sqlx::query_as::<_, Household>(&sql)
        .bind(zipcode)
        .bind(limit)
        .fetch_all(exec)
        .await
}

/// Distinct zipcodes that have at least one household.
pub async fn household_zipcodes<'e, E>(exec: E) -> Result<Vec<String>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_scalar("SELECT DISTINCT zipcode FROM households ORDER BY zipcode")
        .fetch_all(exec)
        .await
}

/// Store a household reading; a missing timestamp means "now".
pub async fn insert_reading<'e, E>(
    exec: E,
    new: &HouseholdReadingCreate,
) -> Result<HouseholdReading, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = format!(
        r#"INSERT INTO household_sensor_readings (
               household_id, device_id, timestamp, pm25, co2, voc, humidity, mold_flag
           ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
           RETURNING {READING_COLUMNS}"#
    );
    sqlx::query_as::<_, HouseholdReading>(&sql)
        .bind(new.household_id)
        .bind(&new.device_id)
        .bind(new.timestamp.unwrap_or_else(Utc::now))
        .bind(new.pm25)
        .bind(new.co2)
        .bind(new.voc)
        .bind(new.humidity)
        .bind(new.mold_flag)
        .fetch_one(exec)
        .await
}

/// Latest household readings across all households in `zipcode`.
pub async fn latest_readings_for_zip<'e, E>(
    exec: E,
    zipcode: &str,
    limit: i64,
) -> Result<Vec<HouseholdReading>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, HouseholdReading>(
        r#"
        SELECT r.reading_id, r.household_id, r.device_id, r.timestamp,
               r.pm25, r.co2, r.voc, r.humidity, r.mold_flag
          FROM household_sensor_readings r
          JOIN households h ON h.household_id = r.household_id
         WHERE h.zipcode = $1
         ORDER BY r.timestamp DESC
         LIMIT $2
        "#,
    )
    .bind(zipcode)
    .bind(limit)
    .fetch_all(exec)
    .await
}

/// Store a household alert; a missing timestamp means "now".
pub async fn insert_alert<'e, E>(
    exec: E,
    household_id: i64,
    event_type: &str,
    alert_message: &str,
    reading_id: Option<i64>,
    timestamp: Option<DateTime<Utc>>,
) -> Result<HouseholdAlert, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = format!(
        r#"INSERT INTO household_alerts (
               household_id, reading_id, event_type, alert_message, timestamp
           ) VALUES ($1, $2, $3, $4, $5)
           RETURNING {ALERT_COLUMNS}"#
    );
    sqlx::query_as::<_, HouseholdAlert>(&sql)
        .bind(household_id)
        .bind(reading_id)
        .bind(event_type)
        .bind(alert_message)
        .bind(timestamp.unwrap_or_else(Utc::now))
        .fetch_one(exec)
        .await
}

pub async fn alerts_for_household<'e, E>(
    exec: E,
    household_id: i64,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<HouseholdAlert>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = format!(
        r#"SELECT {ALERT_COLUMNS}
             FROM household_alerts
            WHERE household_id = $1 AND timestamp >= $2
            ORDER BY timestamp DESC
            LIMIT $3"#
    );
    sqlx::query_as::<_, HouseholdAlert>(&sql)
        .bind(household_id)
        .bind(since)
        .bind(limit)
        .fetch_all(exec)
        .await
}

pub async fn upsert_health_context<'e, E>(
    exec: E,
    ctx: &HealthContext,
) -> Result<HealthContext, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, HealthContext>(
        r#"
        INSERT INTO health_context (zipcode, asthma_rate, er_visit_rate, ej_index)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (zipcode) DO UPDATE SET
            asthma_rate   = EXCLUDED.asthma_rate,
            er_visit_rate = EXCLUDED.er_visit_rate,
            ej_index      = EXCLUDED.ej_index
        RETURNING zipcode, asthma_rate, er_visit_rate, ej_index
        "#,
    )
    .bind(&ctx.zipcode)
    .bind(ctx.asthma_rate)
    .bind(ctx.er_visit_rate)
    .bind(ctx.ej_index)
    .fetch_one(exec)
    .await
}

pub async fn get_health_context<'e, E>(
    exec: E,
    zipcode: &str,
) -> Result<Option<HealthContext>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, HealthContext>(
        "SELECT zipcode, asthma_rate, er_visit_rate, ej_index FROM health_context WHERE zipcode = $1",
    )
    .bind(zipcode)
    .fetch_optional(exec)
    .await
}

/// Household reading joined with its household's zipcode.
#[derive(Debug, sqlx::FromRow)]
struct ZipReadingRecord {
    zipcode: String,
    timestamp: DateTime<Utc>,
    pm25: Option<f64>,
    co2: Option<f64>,
    voc: Option<f64>,
    humidity: Option<f64>,
}

impl From<ZipReadingRecord> for ZipReadingRow {
    fn from(r: ZipReadingRecord) -> Self {
        ZipReadingRow {
            zipcode: r.zipcode,
            timestamp: r.timestamp,
            pm25: r.pm25,
            co2: r.co2,
            voc: r.voc,
            humidity: r.humidity,
        }
    }
}

/// Household readings since `since`, each tagged with its household's zipcode.
///
/// Feeds [`crate::aggregation::zip_trends`]; no grouping happens in SQL.
pub async fn zip_reading_rows<'e, E>(
    exec: E,
    since: DateTime<Utc>,
) -> Result<Vec<ZipReadingRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let records = sqlx::query_as::<_, ZipReadingRecord>(
        r#"
        SELECT h.zipcode, r.timestamp, r.pm25,
               r.co2::DOUBLE PRECISION AS co2,
               r.voc, r.humidity
          FROM household_sensor_readings r
          JOIN households h ON h.household_id = r.household_id
         WHERE r.timestamp >= $1
        "#,
    )
    .bind(since)
    .fetch_all(exec)
    .await?;
    Ok(records.into_iter().map(ZipReadingRow::from).collect())
}
