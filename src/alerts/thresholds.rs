//! Threshold rules for indoor air quality metrics.
//!
//! A [`ThresholdTable`] is an immutable value handed to the evaluator at
//! construction time. [`ThresholdTable::default`] returns the standard table
//! used by the service; tests build their own tables when they need to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{MetricField, Measurements};

// ---

/// Qualitative urgency attached to a threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    // ---
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction in which a reading must cross the limit to trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
}

impl Comparison {
    // ---
    pub fn violated(self, value: f64, limit: f64) -> bool {
        match self {
            Comparison::GreaterThan => value > limit,
            Comparison::GreaterOrEqual => value >= limit,
            Comparison::LessThan => value < limit,
        }
    }
}

/// A single static threshold rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    // ---
    /// Rule key, e.g. `humidity_low`.
    pub metric_key: &'static str,

    /// Reading field inspected by this rule.
    pub field: MetricField,

    pub comparison: Comparison,
    pub limit: f64,
    pub severity: Severity,
    pub unit: &'static str,
    pub message: &'static str,
}

impl ThresholdRule {
    // ---
    /// Value of the inspected field when it is present and crosses the limit.
    pub fn check(&self, reading: &Measurements) -> Option<f64> {
        reading
            .get(self.field)
            .filter(|value| self.comparison.violated(*value, self.limit))
    }
}

/// Ordered set of threshold rules. Evaluation output follows this order.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    rules: Vec<ThresholdRule>,
}

impl ThresholdTable {
    // ---
    pub fn new(rules: Vec<ThresholdRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// Look up a rule by its key (`pm25`, `humidity_high`, ...).
    pub fn get(&self, metric_key: &str) -> Option<&ThresholdRule> {
        self.rules.iter().find(|r| r.metric_key == metric_key)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        // ---
        Self::new(vec![
            ThresholdRule {
                metric_key: "pm25",
                field: MetricField::Pm25,
                comparison: Comparison::GreaterThan,
                limit: 35.0,
                severity: Severity::Warning,
                unit: "μg/m³",
                message: "PM2.5 above healthy levels",
            },
            ThresholdRule {
                metric_key: "co2",
                field: MetricField::Co2,
                comparison: Comparison::GreaterThan,
                limit: 1200.0,
                severity: Severity::Warning,
                unit: "ppm",
                message: "CO2 too high; ventilation recommended",
            },
            ThresholdRule {
                metric_key: "tvoc",
                field: MetricField::Tvoc,
                comparison: Comparison::GreaterThan,
                limit: 200.0,
                severity: Severity::Warning,
                unit: "ppb",
                message: "VOC levels elevated",
            },
            ThresholdRule {
                metric_key: "humidity_low",
                field: MetricField::Humidity,
                comparison: Comparison::LessThan,
                limit: 30.0,
                severity: Severity::Info,
                unit: "%",
                message: "Humidity too low",
            },
            ThresholdRule {
                metric_key: "humidity_high",
                field: MetricField::Humidity,
                comparison: Comparison::GreaterThan,
                limit: 60.0,
                severity: Severity::Info,
                unit: "%",
                message: "Humidity too high",
            },
            ThresholdRule {
                metric_key: "mold_risk",
                field: MetricField::MoldRisk,
                comparison: Comparison::GreaterOrEqual,
                limit: 0.6,
                severity: Severity::Warning,
                unit: "index",
                message: "Mold risk elevated",
            },
        ])
    }
}
