//! Data models for the air quality service.
//!
//! [`Measurements`] is the metric set the alert engine works on; the other
//! types mirror database rows and are returned by the API as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Reading fields that carry a measured quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    Pm25,
    Co2,
    Tvoc,
    Humidity,
    Temperature,
    MoldRisk,
}

impl MetricField {
    // ---
    pub fn name(self) -> &'static str {
        match self {
            MetricField::Pm25 => "pm25",
            MetricField::Co2 => "co2",
            MetricField::Tvoc => "tvoc",
            MetricField::Humidity => "humidity",
            MetricField::Temperature => "temperature",
            MetricField::MoldRisk => "mold_risk",
        }
    }
}

/// Optional metric values of one reading.
///
/// Units: pm25 μg/m³, co2 ppm, tvoc ppb, humidity %RH, temperature °C,
/// mold_risk 0–1 index. A `None` field was not measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    // ---
    pub pm25: Option<f64>,
    pub co2: Option<f64>,
    pub tvoc: Option<f64>,
    pub humidity: Option<f64>,
    pub temperature: Option<f64>,
    pub mold_risk: Option<f64>,
}

impl Measurements {
    // ---
    pub fn get(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::Pm25 => self.pm25,
            MetricField::Co2 => self.co2,
            MetricField::Tvoc => self.tvoc,
            MetricField::Humidity => self.humidity,
            MetricField::Temperature => self.temperature,
            MetricField::MoldRisk => self.mold_risk,
        }
    }
}

/// A monitored zipcode.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Location {
    // ---
    pub id: i32,
    pub zipcode: String,
    pub borough: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Stored reading row from `sensor_readings`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SensorReading {
    // ---
    pub id: i32,
    pub location_id: i32,
    pub timestamp: DateTime<Utc>,
    pub pm25: Option<f64>,
    pub co2: Option<f64>,
    pub tvoc: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub mold_risk: Option<f64>,
}

impl SensorReading {
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

/// Reading joined with its location, as selected by the listing queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingWithLocation {
    // ---
    #[sqlx(flatten)]
    pub reading: SensorReading,
    pub zipcode: String,
    pub borough: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Reading as returned by the API, with its location nested.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReadingOut {
    // ---
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub pm25: Option<f64>,
    pub co2: Option<f64>,
    pub tvoc: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub mold_risk: Option<f64>,
    pub location: Location,
}

impl From<ReadingWithLocation> for SensorReadingOut {
    fn from(row: ReadingWithLocation) -> Self {
        // ---
        let r = row.reading;
        SensorReadingOut {
            id: r.id,
            timestamp: r.timestamp,
            pm25: r.pm25,
            co2: r.co2,
            tvoc: r.tvoc,
            temperature: r.temperature,
            humidity: r.humidity,
            mold_risk: r.mold_risk,
            location: Location {
                id: r.location_id,
                zipcode: row.zipcode,
                borough: row.borough,
                latitude: row.latitude,
                longitude: row.longitude,
            },
        }
    }
}

/// Persisted alert joined with its location.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AlertOut {
    // ---
    pub metric: String,
    pub threshold: f64,
    pub value: f64,
    pub severity: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub zipcode: String,
    pub borough: Option<String>,
}

/// Per-location min/max/avg statistics row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationStatsRow {
    // ---
    #[sqlx(flatten)]
    pub location: Location,
    pub min_pm25: Option<f64>,
    pub max_pm25: Option<f64>,
    pub avg_pm25: Option<f64>,
    pub min_co2: Option<f64>,
    pub max_co2: Option<f64>,
    pub avg_co2: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicHealthData {
    // ---
    pub id: i32,
    pub location_id: i32,
    pub year: i32,
    pub asthma_rate: Option<f64>,
    pub emergency_visits: Option<i32>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Household {
    // ---
    pub household_id: i64,
    pub address: Option<String>,
    pub zipcode: String,
    pub housing_type: String,
    pub risk_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HouseholdReading {
    // ---
    pub reading_id: i64,
    pub household_id: i64,
    pub device_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub pm25: Option<f64>,
    pub co2: Option<i32>,
    pub voc: Option<f64>,
    pub humidity: Option<f64>,
    pub mold_flag: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HouseholdAlert {
    // ---
    pub alert_id: i64,
    pub reading_id: Option<i64>,
    pub household_id: i64,
    pub event_type: String,
    pub alert_message: String,
    pub timestamp: DateTime<Utc>,
}

/// Zip-level public health indicators (mocked source).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HealthContext {
    // ---
    pub zipcode: String,
    pub asthma_rate: Option<f64>,
    pub er_visit_rate: Option<f64>,
    pub ej_index: Option<f64>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn get_maps_every_field() {
        // ---
        let m = Measurements {
            pm25: Some(1.0),
            co2: Some(2.0),
            tvoc: Some(3.0),
            humidity: Some(4.0),
            temperature: Some(5.0),
            mold_risk: Some(6.0),
        };
        let fields = [
            MetricField::Pm25,
            MetricField::Co2,
            MetricField::Tvoc,
            MetricField::Humidity,
            MetricField::Temperature,
            MetricField::MoldRisk,
        ];
        let values: Vec<_> = fields.iter().filter_map(|f| m.get(*f)).collect();
        assert_eq!(values, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn reading_out_nests_location() {
        // ---
        let row = ReadingWithLocation {
            reading: SensorReading {
                id: 7,
                location_id: 3,
                timestamp: Utc.with_ymd_and_hms(2025, 9, 27, 12, 0, 0).unwrap(),
                pm25: Some(12.5),
                co2: None,
                tvoc: None,
                temperature: Some(21.0),
                humidity: Some(44.0),
                mold_risk: None,
            },
            zipcode: "10001".to_string(),
            borough: "Manhattan".to_string(),
            latitude: None,
            longitude: None,
        };
        let out = SensorReadingOut::from(row);
        assert_eq!(out.id, 7);
        assert_eq!(out.location.id, 3);
        assert_eq!(out.location.zipcode, "10001");

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["location"]["borough"], "Manhattan");
        assert!(json["co2"].is_null());
    }
}
