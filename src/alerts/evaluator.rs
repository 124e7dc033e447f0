//! Threshold evaluation over a single reading.

use serde::{Deserialize, Serialize};

use super::thresholds::{Severity, ThresholdTable};
use crate::models::Measurements;

// ---

/// One threshold violation detected on one reading.
///
/// `metric` is the reading field name, so both humidity rules report
/// `"humidity"` and differ only by `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    // ---
    pub metric: String,
    pub threshold: f64,
    pub value: f64,
    pub severity: Severity,
    pub message: String,
}

/// Evaluates readings against an owned [`ThresholdTable`].
///
/// Stateless apart from the table, so a single instance is shared by every
/// request handler.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    table: ThresholdTable,
}

impl AlertEvaluator {
    // ---
    pub fn new(table: ThresholdTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Return every alert triggered by `reading`, in table order.
    ///
    /// Each rule is checked on its own. Absent fields never trigger and the
    /// values are not range checked here.
    pub fn evaluate(&self, reading: &Measurements) -> Vec<TriggeredAlert> {
        // ---
        self.table
            .rules()
            .iter()
            .filter_map(|rule| {
                rule.check(reading).map(|value| TriggeredAlert {
                    metric: rule.field.name().to_string(),
                    threshold: rule.limit,
                    value,
                    severity: rule.severity,
                    message: rule.message.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::alerts::thresholds::{Comparison, ThresholdRule};
    use crate::models::MetricField;

    fn evaluate(reading: Measurements) -> Vec<TriggeredAlert> {
        AlertEvaluator::default().evaluate(&reading)
    }

    #[test]
    fn empty_reading_triggers_nothing() {
        // ---
        assert!(evaluate(Measurements::default()).is_empty());
    }

    #[test]
    fn pm25_is_strictly_greater() {
        // ---
        let at_limit = Measurements {
            pm25: Some(35.0),
            ..Default::default()
        };
        assert!(evaluate(at_limit).is_empty());

        let above = Measurements {
            pm25: Some(35.1),
            ..Default::default()
        };
        let alerts = evaluate(above);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].metric, "pm25");
        assert_eq!(alerts[0].threshold, 35.0);
        assert_eq!(alerts[0].value, 35.1);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].message, "PM2.5 above healthy levels");
    }

    #[test]
    fn mold_risk_is_inclusive() {
        // ---
        let at_limit = Measurements {
            mold_risk: Some(0.6),
            ..Default::default()
        };
        let alerts = evaluate(at_limit);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].metric, "mold_risk");

        let below = Measurements {
            mold_risk: Some(0.59),
            ..Default::default()
        };
        assert!(evaluate(below).is_empty());
    }

    #[test]
    fn humidity_low_and_high() {
        // ---
        let dry = evaluate(Measurements {
            humidity: Some(25.0),
            ..Default::default()
        });
        assert_eq!(dry.len(), 1);
        assert_eq!(dry[0].metric, "humidity");
        assert_eq!(dry[0].threshold, 30.0);
        assert_eq!(dry[0].severity, Severity::Info);

        let damp = evaluate(Measurements {
            humidity: Some(65.0),
            ..Default::default()
        });
        assert_eq!(damp.len(), 1);
        assert_eq!(damp[0].metric, "humidity");
        assert_eq!(damp[0].threshold, 60.0);

        let comfortable = evaluate(Measurements {
            humidity: Some(45.0),
            ..Default::default()
        });
        assert!(comfortable.is_empty());
    }

    #[test]
    fn humidity_rules_are_independent() {
        // ---
        // Overlapping bounds make both humidity rules fire for one value.
        let table = ThresholdTable::new(vec![
            ThresholdRule {
                metric_key: "humidity_low",
                field: MetricField::Humidity,
                comparison: Comparison::LessThan,
                limit: 70.0,
                severity: Severity::Info,
                unit: "%",
                message: "Humidity too low",
            },
            ThresholdRule {
                metric_key: "humidity_high",
                field: MetricField::Humidity,
                comparison: Comparison::GreaterThan,
                limit: 20.0,
                severity: Severity::Info,
                unit: "%",
                message: "Humidity too high",
            },
        ]);
        let alerts = AlertEvaluator::new(table).evaluate(&Measurements {
            humidity: Some(50.0),
            ..Default::default()
        });
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.metric == "humidity"));
        assert_eq!(alerts[0].threshold, 70.0);
        assert_eq!(alerts[1].threshold, 20.0);
    }

    #[test]
    fn all_rules_fire_in_table_order() {
        // ---
        let alerts = evaluate(Measurements {
            pm25: Some(80.0),
            co2: Some(1500.0),
            tvoc: Some(450.0),
            humidity: Some(72.0),
            temperature: Some(29.0),
            mold_risk: Some(0.9),
        });
        let metrics: Vec<_> = alerts.iter().map(|a| a.metric.as_str()).collect();
        assert_eq!(metrics, ["pm25", "co2", "tvoc", "humidity", "mold_risk"]);
    }

    #[test]
    fn temperature_alone_never_alerts() {
        // ---
        let alerts = evaluate(Measurements {
            temperature: Some(59.0),
            ..Default::default()
        });
        assert!(alerts.is_empty());
    }

    #[test]
    fn evaluation_is_idempotent() {
        // ---
        let evaluator = AlertEvaluator::default();
        let reading = Measurements {
            pm25: Some(40.0),
            humidity: Some(20.0),
            ..Default::default()
        };
        assert_eq!(evaluator.evaluate(&reading), evaluator.evaluate(&reading));
    }

    #[test]
    fn substituted_table_changes_limits() {
        // ---
        let table = ThresholdTable::new(vec![ThresholdRule {
            metric_key: "co2",
            field: MetricField::Co2,
            comparison: Comparison::GreaterThan,
            limit: 800.0,
            severity: Severity::Critical,
            unit: "ppm",
            message: "CO2 above classroom limit",
        }]);
        let evaluator = AlertEvaluator::new(table);
        let alerts = evaluator.evaluate(&Measurements {
            co2: Some(900.0),
            pm25: Some(500.0),
            ..Default::default()
        });
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].threshold, 800.0);
    }
}
