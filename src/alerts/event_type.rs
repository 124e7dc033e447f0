//! Direction labels for triggered alerts.
//!
//! The evaluator reports both humidity rules as `"humidity"`; the direction
//! is recovered by comparing the value to the threshold. Household alert
//! records and the recommendation lookup both go through these functions so
//! the two labels never drift apart.

use super::evaluator::TriggeredAlert;

// ---

const HIGH_ONLY_METRICS: [&str; 4] = ["pm25", "co2", "tvoc", "mold_risk"];

/// `humidity_low` when `value < threshold`, otherwise `humidity_high`.
pub fn humidity_direction(value: f64, threshold: f64) -> &'static str {
    if value < threshold {
        "humidity_low"
    } else {
        "humidity_high"
    }
}

/// Key used to look up a recommendation bundle for an alert.
pub fn rule_key(metric: &str, value: f64, threshold: f64) -> &str {
    // ---
    if metric == "humidity" {
        humidity_direction(value, threshold)
    } else {
        metric
    }
}

/// Event type stored on household alert records, e.g. `pm25_high`.
pub fn event_type(metric: &str, value: f64, threshold: f64) -> String {
    // ---
    if metric == "humidity" {
        humidity_direction(value, threshold).to_string()
    } else if HIGH_ONLY_METRICS.contains(&metric) {
        format!("{metric}_high")
    } else {
        metric.to_string()
    }
}

impl TriggeredAlert {
    // ---
    pub fn event_type(&self) -> String {
        event_type(&self.metric, self.value, self.threshold)
    }

    pub fn rule_key(&self) -> &str {
        rule_key(&self.metric, self.value, self.threshold)
    }
}
