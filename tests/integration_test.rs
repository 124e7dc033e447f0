//! Live-server tests. Start the service against a scratch database, then run
//! `cargo test -- --ignored` with `BASE_URL` pointing at it.

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct IngestResponse {
    status: String,
    reading_id: i32,
    alerts_created: usize,
    household_reading_id: Option<i64>,
    advice: Option<Vec<String>>,
    reasons: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Household {
    household_id: i64,
    zipcode: String,
}

#[derive(Debug, Deserialize)]
struct HouseholdAlert {
    event_type: String,
    reading_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ZipTrend {
    zipcode: String,
    reading_count: i64,
}

#[derive(Debug, Deserialize)]
struct ZipTrendsResponse {
    results: Vec<ZipTrend>,
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into())
}

/// A zipcode unlikely to collide with data left by earlier runs.
fn scratch_zip() -> String {
    let id = uuid::Uuid::new_v4().as_u128();
    format!("9{:04}", id % 10_000)
}

async fn create_household(client: &Client, zipcode: &str) -> Result<Household> {
    // ---
    let url = format!("{}/api/v1/households", base_url());
    let household = client
        .post(&url)
        .json(&json!({
            "zipcode": zipcode,
            "housing_type": "apartment",
            "address": format!("{} Test St", uuid::Uuid::new_v4()),
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(household)
}

#[tokio::test]
#[ignore]
async fn ingest_clean_reading_has_no_advice() -> Result<()> {
    // ---
    let client = Client::new();
    let url = format!("{}/api/v1/sensor-ingest", base_url());

    let resp: IngestResponse = client
        .post(&url)
        .json(&json!({
            "zipcode": scratch_zip(),
            "borough": "Queens",
            "pm25": 8.0,
            "co2": 650.0,
            "humidity": 45.0,
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    assert_eq!(resp.status, "ok");
    assert!(resp.reading_id > 0);
    assert_eq!(resp.alerts_created, 0);
    assert!(resp.advice.is_none());
    assert!(resp.reasons.is_none());
    assert!(resp.household_reading_id.is_none());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn ingest_mirrors_alerts_to_household() -> Result<()> {
    // ---
    let client = Client::new();
    let zipcode = scratch_zip();
    let household = create_household(&client, &zipcode).await?;
    assert_eq!(household.zipcode, zipcode);

    let url = format!("{}/api/v1/sensor-ingest", base_url());
    let resp: IngestResponse = client
        .post(&url)
        .json(&json!({
            "zipcode": zipcode,
            "borough": "Brooklyn",
            "household_id": household.household_id,
            "co2": 1300.7,
            "humidity": 25.0,
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    assert_eq!(resp.alerts_created, 2);
    let reasons = resp.reasons.unwrap_or_default();
    assert!(reasons.iter().any(|r| r.starts_with("co2=1300.7")), "{reasons:?}");
    let hh_reading = resp.household_reading_id.expect("household reading id");

    let url = format!(
        "{}/api/v1/households/{}/alerts?hours_back=1",
        base_url(),
        household.household_id
    );
    let alerts: Vec<HouseholdAlert> = client.get(&url).send().await?.json().await?;
    let mut kinds: Vec<_> = alerts.iter().map(|a| a.event_type.as_str()).collect();
    kinds.sort_unstable();
    assert_eq!(kinds, vec!["co2_high", "humidity_low"]);
    assert!(alerts.iter().all(|a| a.reading_id == Some(hh_reading)));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn ingest_for_unknown_household_is_404() -> Result<()> {
    // ---
    let client = Client::new();
    let url = format!("{}/api/v1/sensor-ingest", base_url());

    let resp = client
        .post(&url)
        .json(&json!({
            "zipcode": scratch_zip(),
            "borough": "Bronx",
            "household_id": i64::MAX,
            "pm25": 50.0,
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn zip_trends_count_household_readings() -> Result<()> {
    // ---
    let client = Client::new();
    let zipcode = scratch_zip();
    let household = create_household(&client, &zipcode).await?;

    let url = format!(
        "{}/api/v1/households/{}/readings",
        base_url(),
        household.household_id
    );
    for pm25 in [10.0, 20.0] {
        client
            .post(&url)
            .json(&json!({ "household_id": household.household_id, "pm25": pm25 }))
            .send()
            .await?
            .error_for_status()?;
    }

    let url = format!("{}/api/v1/aggregations/zip-trends?hours_back=1", base_url());
    let trends: ZipTrendsResponse = client.get(&url).send().await?.json().await?;
    let ours = trends
        .results
        .iter()
        .find(|t| t.zipcode == zipcode)
        .expect("zip summary present");
    assert!(ours.reading_count >= 2);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn missing_health_context_is_404() -> Result<()> {
    // ---
    let client = Client::new();
    let url = format!("{}/api/v1/health-context/{}", base_url(), scratch_zip());
    let resp = client.get(&url).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}
