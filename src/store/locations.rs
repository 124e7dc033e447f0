use sqlx::{PgConnection, PgExecutor};

use crate::models::Location;

// ---

pub async fn get_location<'e, E>(exec: E, zipcode: &str) -> Result<Option<Location>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    // ---
    sqlx::query_as::<_, Location>(
        "SELECT id, zipcode, borough, latitude, longitude FROM locations WHERE zipcode = $1",
    )
    .bind(zipcode)
    .fetch_optional(exec)
    .await
}

/// Return the location for `zipcode`, creating it on first sight.
///
/// An existing location keeps its stored borough.
pub async fn get_or_create_location(
    conn: &mut PgConnection,
    zipcode: &str,
    borough: &str,
) -> Result<Location, sqlx::Error> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO locations (zipcode, borough)
        VALUES ($1, $2)
        ON CONFLICT (zipcode) DO NOTHING
        "#,
    )
    .bind(zipcode)
    .bind(borough)
    .execute(&mut *conn)
    .await?;

    sqlx::query_as::<_, Location>(
        "SELECT id, zipcode, borough, latitude, longitude FROM locations WHERE zipcode = $1",
    )
    .bind(zipcode)
    .fetch_one(&mut *conn)
    .await
}
