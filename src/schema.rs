//! Database schema management for `codemetal-airquality`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Statements run in order inside one transaction. Every statement is
/// idempotent so the list is safe to replay on each startup.
const STATEMENTS: &[&str] = &[
    // Locations and the general readings/alerts they own
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id        SERIAL PRIMARY KEY,
        zipcode   VARCHAR(10) NOT NULL UNIQUE,
        borough   VARCHAR(50) NOT NULL,
        latitude  DOUBLE PRECISION,
        longitude DOUBLE PRECISION
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sensor_readings (
        id          SERIAL PRIMARY KEY,
        location_id INTEGER     NOT NULL REFERENCES locations (id),
        timestamp   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        pm25        DOUBLE PRECISION,
        co2         DOUBLE PRECISION,
        tvoc        DOUBLE PRECISION,
        temperature DOUBLE PRECISION,
        humidity    DOUBLE PRECISION,
        mold_risk   DOUBLE PRECISION
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sensor_readings_timestamp ON sensor_readings (timestamp);",
    "CREATE INDEX IF NOT EXISTS idx_sensor_readings_location ON sensor_readings (location_id, timestamp);",
    r#"
    CREATE TABLE IF NOT EXISTS alerts (
        id          SERIAL PRIMARY KEY,
        location_id INTEGER          NOT NULL REFERENCES locations (id),
        reading_id  INTEGER          REFERENCES sensor_readings (id),
        created_at  TIMESTAMPTZ      NOT NULL DEFAULT NOW(),
        metric      VARCHAR(50)      NOT NULL,
        threshold   DOUBLE PRECISION NOT NULL,
        value       DOUBLE PRECISION NOT NULL,
        severity    VARCHAR(20)      NOT NULL,
        message     VARCHAR(255)     NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_alerts_created_at ON alerts (created_at);",
    r#"
    CREATE TABLE IF NOT EXISTS public_health_data (
        id               SERIAL PRIMARY KEY,
        location_id      INTEGER NOT NULL REFERENCES locations (id),
        year             INTEGER NOT NULL,
        asthma_rate      DOUBLE PRECISION,
        emergency_visits INTEGER
    );
    "#,
    // Household-scoped tables
    r#"
    CREATE TABLE IF NOT EXISTS households (
        household_id BIGSERIAL PRIMARY KEY,
        address      VARCHAR(255),
        zipcode      VARCHAR(10)      NOT NULL,
        housing_type VARCHAR(50)      NOT NULL,
        risk_score   DOUBLE PRECISION NOT NULL DEFAULT 0,
        created_at   TIMESTAMPTZ      NOT NULL DEFAULT NOW(),
        updated_at   TIMESTAMPTZ      NOT NULL DEFAULT NOW()
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_households_zipcode ON households (zipcode);",
    r#"
    CREATE TABLE IF NOT EXISTS household_sensor_readings (
        reading_id   BIGSERIAL PRIMARY KEY,
        household_id BIGINT      NOT NULL REFERENCES households (household_id) ON DELETE CASCADE,
        device_id    VARCHAR(100),
        timestamp    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        pm25         DOUBLE PRECISION,
        co2          INTEGER,
        voc          DOUBLE PRECISION,
        humidity     DOUBLE PRECISION,
        mold_flag    BOOLEAN     NOT NULL DEFAULT FALSE
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_hh_sensor_readings_household_time ON household_sensor_readings (household_id, timestamp);",
    "CREATE INDEX IF NOT EXISTS idx_hh_sensor_readings_device_time ON household_sensor_readings (device_id, timestamp);",
    r#"
    CREATE TABLE IF NOT EXISTS household_alerts (
        alert_id      BIGSERIAL PRIMARY KEY,
        reading_id    BIGINT      REFERENCES household_sensor_readings (reading_id) ON DELETE SET NULL,
        household_id  BIGINT      NOT NULL REFERENCES households (household_id) ON DELETE CASCADE,
        event_type    VARCHAR(50) NOT NULL,
        alert_message TEXT        NOT NULL,
        timestamp     TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_hh_alerts_household_time ON household_alerts (household_id, timestamp);",
    r#"
    CREATE TABLE IF NOT EXISTS health_context (
        zipcode       VARCHAR(10) PRIMARY KEY,
        asthma_rate   DOUBLE PRECISION,
        er_visit_rate DOUBLE PRECISION,
        ej_index      DOUBLE PRECISION
    );
    "#,
    // Keep households.updated_at current on every update
    r#"
    CREATE OR REPLACE FUNCTION set_households_updated_at()
    RETURNS TRIGGER AS $$
    BEGIN
        NEW.updated_at = NOW();
        RETURN NEW;
    END;
    $$ LANGUAGE plpgsql;
    "#,
    "DROP TRIGGER IF EXISTS trg_households_updated_at ON households;",
    r#"
    CREATE TRIGGER trg_households_updated_at
    BEFORE UPDATE ON households
    FOR EACH ROW
    EXECUTE PROCEDURE set_households_updated_at();
    "#,
];

/// Create or update the database schema (idempotent).
///
/// Creates the general `locations`/`sensor_readings`/`alerts` tables, the
/// household tables used by the zip trend aggregation, and `health_context`.
/// Safe to call on every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    tracing::info!("Database schema ready ({} statements)", STATEMENTS.len());
    Ok(())
}
