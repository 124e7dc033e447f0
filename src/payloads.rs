//! Request bodies accepted by the API.
//!
//! Range limits live here as `validator` attributes; the alert engine relies
//! on them and does not check ranges itself.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::Measurements;

// ---

/// Single reading posted to `/sensor-ingest`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngestPayload {
    // ---
    #[validate(length(min = 1, max = 10))]
    pub zipcode: String,
    #[validate(length(max = 50))]
    pub borough: String,

    /// Also record the reading and its alerts for this household.
    pub household_id: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,

    #[validate(range(min = 0.0, max = 1000.0))]
    pub pm25: Option<f64>,
    #[validate(range(min = 300.0, max = 10000.0))]
    pub co2: Option<f64>,
    #[validate(range(min = 0.0, max = 2000.0))]
    pub tvoc: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: Option<f64>,
    #[validate(range(min = -20.0, max = 60.0))]
    pub temperature: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub mold_risk: Option<f64>,
}

impl IngestPayload {
    // ---
    pub fn measurements(&self) -> Measurements {
        Measurements {
            pm25: self.pm25,
            co2: self.co2,
            tvoc: self.tvoc,
            humidity: self.humidity,
            temperature: self.temperature,
            mold_risk: self.mold_risk,
        }
    }
}

/// Reading posted to `/readings`, addressed by zipcode.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SensorReadingCreate {
    // ---
    #[validate(length(min = 1, max = 10))]
    pub location_zipcode: String,
    pub timestamp: Option<DateTime<Utc>>,

    #[validate(range(min = 0.0, max = 1000.0))]
    pub pm25: Option<f64>,
    #[validate(range(min = 300.0, max = 10000.0))]
    pub co2: Option<f64>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub tvoc: Option<f64>,
    #[validate(range(min = -20.0, max = 60.0))]
    pub temperature: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub mold_risk: Option<f64>,
}

impl SensorReadingCreate {
    // ---
    pub fn measurements(&self) -> Measurements {
        Measurements {
            pm25: self.pm25,
            co2: self.co2,
            tvoc: self.tvoc,
            humidity: self.humidity,
            temperature: self.temperature,
            mold_risk: self.mold_risk,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkSensorReading {
    #[validate(nested)]
    pub readings: Vec<SensorReadingCreate>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PublicHealthDataCreate {
    // ---
    #[validate(length(min = 1, max = 10))]
    pub location_zipcode: String,
    #[validate(range(min = 2000, max = 2030))]
    pub year: i32,
    /// Asthma rate per 10,000 people.
    #[validate(range(min = 0.0))]
    pub asthma_rate: Option<f64>,
    /// Annual respiratory emergency visits.
    #[validate(range(min = 0))]
    pub emergency_visits: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HouseholdCreate {
    // ---
    #[validate(length(min = 1, max = 10))]
    pub zipcode: String,
    #[validate(length(min = 1, max = 50))]
    pub housing_type: String,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub risk_score: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HouseholdReadingCreate {
    // ---
    pub household_id: i64,
    #[validate(length(max = 100))]
    pub device_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub pm25: Option<f64>,
    #[validate(range(min = 0, max = 100000))]
    pub co2: Option<i32>,
    #[validate(range(min = 0.0, max = 100000.0))]
    pub voc: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub mold_flag: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HouseholdAlertCreate {
    // ---
    pub household_id: i64,
    #[validate(length(min = 1, max = 50))]
    pub event_type: String,
    #[validate(length(min = 1))]
    pub alert_message: String,
    pub reading_id: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HealthContextUpsert {
    // ---
    #[validate(length(min = 1, max = 10))]
    pub zipcode: String,
    pub asthma_rate: Option<f64>,
    pub er_visit_rate: Option<f64>,
    pub ej_index: Option<f64>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn ingest(body: serde_json::Value) -> IngestPayload {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn ingest_accepts_partial_readings() {
        // ---
        let payload = ingest(json!({
            "zipcode": "10001",
            "borough": "Manhattan",
            "pm25": 42.0,
        }));
        assert!(payload.validate().is_ok());
        let m = payload.measurements();
        assert_eq!(m.pm25, Some(42.0));
        assert_eq!(m.co2, None);
        assert!(payload.household_id.is_none());
    }

    #[test]
    fn ingest_rejects_out_of_range() {
        // ---
        let payload = ingest(json!({
            "zipcode": "10001",
            "borough": "Manhattan",
            "co2": 250.0,
            "mold_risk": 1.2,
        }));
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("co2"));
        assert!(fields.contains_key("mold_risk"));
    }

    #[test]
    fn ingest_requires_zipcode() {
        // ---
        let payload = ingest(json!({ "zipcode": "", "borough": "Queens" }));
        assert!(payload.validate().is_err());
    }

    #[test]
    fn bulk_validates_each_reading() {
        // ---
        let bulk: BulkSensorReading = serde_json::from_value(json!({
            "readings": [
                { "location_zipcode": "10001", "pm25": 12.0 },
                { "location_zipcode": "11201", "tvoc": 1500.0 },
            ]
        }))
        .unwrap();
        assert!(bulk.validate().is_err());
    }

    #[test]
    fn household_defaults() {
        // ---
        let hh: HouseholdCreate = serde_json::from_value(json!({
            "zipcode": "10001",
            "housing_type": "apartment",
        }))
        .unwrap();
        assert_eq!(hh.risk_score, 0.0);
        assert!(hh.validate().is_ok());

        let reading: HouseholdReadingCreate =
            serde_json::from_value(json!({ "household_id": 1, "pm25": 15.0 })).unwrap();
        assert!(!reading.mold_flag);
        assert!(reading.validate().is_ok());
    }
}
