//! Sensor simulator: posts random readings to a running service.
//!
//! # Environment Variables
//! - `SIMULATOR_BASE_URL` (optional) – service root (default: `http://localhost:8080`)
//! - `SIMULATOR_ZIPCODES` (optional) – comma separated zipcodes (default: `10001,11201`)
//! - `SIMULATOR_BOROUGH` (optional) – borough sent with every reading (default: `Manhattan`)
//! - `SIMULATOR_INTERVAL_SECONDS` (optional) – pause between rounds (default: 5)
use std::{env, time::Duration};

use anyhow::{anyhow, Result};
use chrono::Utc;
use dotenvy::dotenv;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::EnvFilter;

use codemetal_airquality::models::Measurements;
use codemetal_airquality::simulate::random_measurements;

// ---

#[derive(Debug, Serialize)]
struct IngestRequest<'a> {
    zipcode: &'a str,
    borough: &'a str,
    timestamp: chrono::DateTime<Utc>,
    #[serde(flatten)]
    measurements: Measurements,
}

#[derive(Debug, Deserialize)]
struct IngestReply {
    reading_id: i32,
    alerts_created: usize,
}

struct Settings {
    endpoint: String,
    zipcodes: Vec<String>,
    borough: String,
    interval: Duration,
}

fn load_settings() -> Result<Settings> {
    // ---
    let base_url =
        env::var("SIMULATOR_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let zipcodes = env::var("SIMULATOR_ZIPCODES")
        .unwrap_or_else(|_| "10001,11201".to_string())
        .split(',')
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();
    let borough = env::var("SIMULATOR_BOROUGH").unwrap_or_else(|_| "Manhattan".to_string());
    let interval = env::var("SIMULATOR_INTERVAL_SECONDS")
        .ok()
        .map(|v| v.parse::<u64>())
        .transpose()
        .map_err(|e| anyhow!("Invalid SIMULATOR_INTERVAL_SECONDS: {}", e))?
        .unwrap_or(5);

    if zipcodes.is_empty() {
        return Err(anyhow!("SIMULATOR_ZIPCODES must name at least one zipcode"));
    }

    Ok(Settings {
        endpoint: format!("{}/api/v1/sensor-ingest", base_url.trim_end_matches('/')),
        zipcodes,
        borough,
        interval: Duration::from_secs(interval),
    })
}

async fn post_round(client: &Client, settings: &Settings) {
    // ---
    for zipcode in &settings.zipcodes {
        // The rng is not Send, so it must not live across the await below.
        let measurements = random_measurements(&mut rand::rng());
        let body = IngestRequest {
            zipcode,
            borough: &settings.borough,
            timestamp: Utc::now(),
            measurements,
        };

        match client.post(&settings.endpoint).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<IngestReply>().await {
                Ok(reply) => tracing::info!(
                    "{}: created reading {} with {} alerts",
                    zipcode,
                    reply.reading_id,
                    reply.alerts_created
                ),
                Err(e) => tracing::warn!("{}: unreadable response: {}", zipcode, e),
            },
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                tracing::warn!("{}: error {}: {}", zipcode, status, text);
            }
            Err(e) => tracing::warn!("{}: request failed: {}", zipcode, e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let settings = load_settings()?;
    let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

    tracing::info!(
        "Simulator posting to {} every {}s; zipcodes={:?}",
        settings.endpoint,
        settings.interval.as_secs(),
        settings.zipcodes
    );

    let mut ticker = tokio::time::interval(settings.interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => post_round(&client, &settings).await,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("Simulator stopped");
    Ok(())
}
