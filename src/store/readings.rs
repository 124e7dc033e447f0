use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::models::{
    LocationStatsRow, Measurements, PublicHealthData, ReadingWithLocation, SensorReading,
};

// ---

const READING_WITH_LOCATION: &str = r#"
    SELECT r.id, r.location_id, r.timestamp,
           r.pm25, r.co2, r.tvoc, r.temperature, r.humidity, r.mold_risk,
           l.zipcode, l.borough, l.latitude, l.longitude
      FROM sensor_readings r
      JOIN locations l ON l.id = r.location_id
"#;

/// Store a reading under `location_id`.
pub async fn insert_reading<'e, E>(
    exec: E,
    location_id: i32,
    timestamp: DateTime<Utc>,
    m: &Measurements,
) -> Result<SensorReading, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, SensorReading>(
        r#"
        INSERT INTO sensor_readings (
            location_id, timestamp,
            pm25, co2, tvoc, temperature, humidity, mold_risk
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, location_id, timestamp,
                  pm25, co2, tvoc, temperature, humidity, mold_risk
        "#,
    )
    .bind(location_id)
    .bind(timestamp)
    .bind(m.pm25)
    .bind(m.co2)
    .bind(m.tvoc)
    .bind(m.temperature)
    .bind(m.humidity)
    .bind(m.mold_risk)
    .fetch_one(exec)
    .await
}

/// Readings filtered by zipcode and time range, newest first.
pub async fn list_readings<'e, E>(
    exec: E,
    zipcode: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<ReadingWithLocation>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = format!(
        r#"{READING_WITH_LOCATION}
         WHERE ($1::TEXT IS NULL OR l.zipcode = $1)
           AND ($2::TIMESTAMPTZ IS NULL OR r.timestamp >= $2)
           AND ($3::TIMESTAMPTZ IS NULL OR r.timestamp <= $3)
         ORDER BY r.timestamp DESC
         LIMIT $4"#
    );
    sqlx::query_as::<_, ReadingWithLocation>(&sql)
        .bind(zipcode)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(exec)
        .await
}

/// Most recent reading of each location, at most `limit` locations.
pub async fn latest_per_location<'e, E>(
    exec: E,
    limit: i64,
) -> Result<Vec<ReadingWithLocation>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = r#"
        SELECT DISTINCT ON (r.location_id)
               r.id, r.location_id, r.timestamp,
               r.pm25, r.co2, r.tvoc, r.temperature, r.humidity, r.mold_risk,
               l.zipcode, l.borough, l.latitude, l.longitude
          FROM sensor_readings r
          JOIN locations l ON l.id = r.location_id
         ORDER BY r.location_id, r.timestamp DESC
         LIMIT $1
    "#;
    sqlx::query_as::<_, ReadingWithLocation>(sql)
        .bind(limit)
        .fetch_all(exec)
        .await
}

/// Newest reading overall, or for `zipcode` when given.
pub async fn latest_for_zip<'e, E>(
    exec: E,
    zipcode: Option<&str>,
) -> Result<Option<ReadingWithLocation>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    let sql = format!(
        r#"{READING_WITH_LOCATION}
         WHERE ($1::TEXT IS NULL OR l.zipcode = $1)
         ORDER BY r.timestamp DESC
         LIMIT 1"#
    );
    sqlx::query_as::<_, ReadingWithLocation>(&sql)
        .bind(zipcode)
        .fetch_optional(exec)
        .await
}

/// Per-location pm25/co2 min/max/avg over readings since `since`.
pub async fn location_stats<'e, E>(
    exec: E,
    zipcode: Option<&str>,
    since: DateTime<Utc>,
) -> Result<Vec<LocationStatsRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, LocationStatsRow>(
        r#"
        SELECT l.id, l.zipcode, l.borough, l.latitude, l.longitude,
               MIN(r.pm25) AS min_pm25,
               MAX(r.pm25) AS max_pm25,
               AVG(r.pm25) AS avg_pm25,
               MIN(r.co2)  AS min_co2,
               MAX(r.co2)  AS max_co2,
               AVG(r.co2)  AS avg_co2,
               MAX(r.timestamp) AS last_updated
          FROM locations l
          JOIN sensor_readings r ON r.location_id = l.id
         WHERE r.timestamp >= $1
           AND ($2::TEXT IS NULL OR l.zipcode = $2)
         GROUP BY l.id
         ORDER BY l.zipcode
        "#,
    )
    .bind(since)
    .bind(zipcode)
    .fetch_all(exec)
    .await
}

pub async fn insert_public_health<'e, E>(
    exec: E,
    location_id: i32,
    year: i32,
    asthma_rate: Option<f64>,
    emergency_visits: Option<i32>,
) -> Result<PublicHealthData, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, PublicHealthData>(
        r#"
        INSERT INTO public_health_data (location_id, year, asthma_rate, emergency_visits)
        VALUES ($1, $2, $3, $4)
        RETURNING id, location_id, year, asthma_rate, emergency_visits
        "#,
    )
    .bind(location_id)
    .bind(year)
    .bind(asthma_rate)
    .bind(emergency_visits)
    .fetch_one(exec)
    .await
}

pub async fn list_public_health<'e, E>(
    exec: E,
    location_id: i32,
    year: Option<i32>,
) -> Result<Vec<PublicHealthData>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, PublicHealthData>(
        r#"
        SELECT id, location_id, year, asthma_rate, emergency_visits
          FROM public_health_data
         WHERE location_id = $1
           AND ($2::INTEGER IS NULL OR year = $2)
         ORDER BY year DESC
        "#,
    )
    .bind(location_id)
    .bind(year)
    .fetch_all(exec)
    .await
}
