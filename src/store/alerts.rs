use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::alerts::TriggeredAlert;
use crate::models::AlertOut;

// ---

/// Persist one triggered alert against a location and, optionally, a reading.
pub async fn insert_alert<'e, E>(
    exec: E,
    location_id: i32,
    reading_id: Option<i32>,
    alert: &TriggeredAlert,
) -> Result<i32, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_scalar(
        r#"
        INSERT INTO alerts (
            location_id, reading_id, metric, threshold, value, severity, message
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(location_id)
    .bind(reading_id)
    .bind(&alert.metric)
    .bind(alert.threshold)
    .bind(alert.value)
    .bind(alert.severity.as_str())
    .bind(&alert.message)
    .fetch_one(exec)
    .await
}

/// Alerts created since `since`, newest first, optionally for one zipcode.
pub async fn list_alerts<'e, E>(
    exec: E,
    zipcode: Option<&str>,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<AlertOut>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, AlertOut>(
        r#"
        SELECT a.metric, a.threshold, a.value, a.severity, a.message, a.created_at,
               l.zipcode, l.borough
          FROM alerts a
          JOIN locations l ON l.id = a.location_id
         WHERE a.created_at >= $1
           AND ($2::TEXT IS NULL OR l.zipcode = $2)
         ORDER BY a.created_at DESC
         LIMIT $3
        "#,
    )
    .bind(since)
    .bind(zipcode)
    .bind(limit)
    .fetch_all(exec)
    .await
}
