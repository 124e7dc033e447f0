//! Rule-based advice for triggered alerts.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::evaluator::TriggeredAlert;

// ---

/// Actions and per-alert reasons returned to API callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Advice {
    pub actions: Vec<String>,
    pub reasons: Vec<String>,
}

impl Advice {
    // ---
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.reasons.is_empty()
    }
}

/// Static mapping from rule key to an ordered bundle of actions.
#[derive(Debug, Clone)]
pub struct RecommendationResolver {
    bundles: HashMap<String, Vec<String>>,
}

impl RecommendationResolver {
    // ---
    pub fn new<K, A>(bundles: impl IntoIterator<Item = (K, Vec<A>)>) -> Self
    where
        K: Into<String>,
        A: Into<String>,
    {
        let bundles = bundles
            .into_iter()
            .map(|(key, actions)| (key.into(), actions.into_iter().map(Into::into).collect()))
            .collect();
        Self { bundles }
    }

    /// Actions registered under `key`; empty for unknown keys.
    pub fn bundle(&self, key: &str) -> &[String] {
        self.bundles.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Flattened actions for `alerts`, in alert order, each action once.
    pub fn actions_for(&self, alerts: &[TriggeredAlert]) -> Vec<String> {
        // ---
        let mut seen = HashSet::new();
        alerts
            .iter()
            .flat_map(|alert| self.bundle(alert.rule_key()))
            .filter(|action| seen.insert(*action))
            .cloned()
            .collect()
    }

    /// Actions plus reasons for `alerts`.
    pub fn advise(&self, alerts: &[TriggeredAlert]) -> Advice {
        Advice {
            actions: self.actions_for(alerts),
            reasons: reasons_for(alerts),
        }
    }
}

/// One `"{metric}={value} threshold={threshold} ({severity})"` line per alert.
///
/// Not de-duplicated. Floats keep their fractional part (`1300.0`).
pub fn reasons_for(alerts: &[TriggeredAlert]) -> Vec<String> {
    alerts
        .iter()
        .map(|a| {
            format!(
                "{}={:?} threshold={:?} ({})",
                a.metric, a.value, a.threshold, a.severity
            )
        })
        .collect()
}

impl Default for RecommendationResolver {
    fn default() -> Self {
        // ---
        Self::new([
            (
                "pm25",
                vec![
                    "Run a HEPA air purifier on high for 1-2 hours.",
                    "Seal gaps around windows/doors; avoid indoor burning/cooking without ventilation.",
                    "Check outdoor AQI; open windows only if outdoor air is better.",
                ],
            ),
            (
                "co2",
                vec![
                    "Increase ventilation: open windows or run mechanical ventilation.",
                    "Reduce room occupancy if possible.",
                    "Check HVAC fresh air intake and filters.",
                ],
            ),
            (
                "tvoc",
                vec![
                    "Increase ventilation and identify VOC sources (cleaners, paints, fragrances).",
                    "Use low-VOC products; store chemicals properly.",
                    "Run an air purifier with activated carbon if available.",
                ],
            ),
            (
                "humidity_low",
                vec![
                    "Use a humidifier and target 40-50% RH.",
                    "Add moisture sources (e.g., plants, bowls of water) temporarily.",
                    "Avoid over-humidifying to prevent mold.",
                ],
            ),
            (
                "humidity_high",
                vec![
                    "Run a dehumidifier and increase ventilation.",
                    "Use exhaust fans during showering/cooking.",
                    "Fix leaks and dry wet materials within 24-48 hours.",
                ],
            ),
            (
                "mold_risk",
                vec![
                    "Reduce indoor humidity to 40-50% RH.",
                    "Increase ventilation and dry damp areas quickly.",
                    "Inspect for hidden moisture and clean visible mold safely.",
                ],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::alerts::thresholds::Severity;

    fn alert(metric: &str, value: f64, threshold: f64, severity: Severity) -> TriggeredAlert {
        TriggeredAlert {
            metric: metric.to_string(),
            threshold,
            value,
            severity,
            message: String::new(),
        }
    }

    #[test]
    fn empty_alerts_give_empty_advice() {
        // ---
        let advice = RecommendationResolver::default().advise(&[]);
        assert!(advice.actions.is_empty());
        assert!(advice.reasons.is_empty());
        assert!(advice.is_empty());
    }

    #[test]
    fn bundles_follow_alert_order() {
        // ---
        let resolver = RecommendationResolver::default();
        let alerts = [
            alert("pm25", 40.0, 35.0, Severity::Warning),
            alert("co2", 1300.0, 1200.0, Severity::Warning),
        ];
        let actions = resolver.actions_for(&alerts);
        let mut expected = resolver.bundle("pm25").to_vec();
        expected.extend_from_slice(resolver.bundle("co2"));
        assert_eq!(actions, expected);
    }

    #[test]
    fn shared_actions_kept_at_first_position() {
        // ---
        let resolver = RecommendationResolver::new([
            ("pm25", vec!["Open a window.", "Run a purifier."]),
            ("co2", vec!["Reduce occupancy.", "Open a window."]),
        ]);
        let alerts = [
            alert("pm25", 40.0, 35.0, Severity::Warning),
            alert("co2", 1300.0, 1200.0, Severity::Warning),
        ];
        assert_eq!(
            resolver.actions_for(&alerts),
            ["Open a window.", "Run a purifier.", "Reduce occupancy."]
        );
    }

    #[test]
    fn repeated_metric_added_once() {
        // ---
        let resolver = RecommendationResolver::default();
        let alerts = [
            alert("co2", 1300.0, 1200.0, Severity::Warning),
            alert("co2", 1500.0, 1200.0, Severity::Warning),
        ];
        assert_eq!(resolver.actions_for(&alerts), resolver.bundle("co2"));
        assert_eq!(reasons_for(&alerts).len(), 2);
    }

    #[test]
    fn humidity_resolves_direction() {
        // ---
        let resolver = RecommendationResolver::default();
        let dry = [alert("humidity", 25.0, 30.0, Severity::Info)];
        assert_eq!(resolver.actions_for(&dry), resolver.bundle("humidity_low"));

        let damp = [alert("humidity", 65.0, 60.0, Severity::Info)];
        assert_eq!(resolver.actions_for(&damp), resolver.bundle("humidity_high"));
    }

    #[test]
    fn unknown_metric_contributes_nothing() {
        // ---
        let resolver = RecommendationResolver::default();
        let alerts = [
            alert("radon", 5.0, 4.0, Severity::Critical),
            alert("tvoc", 300.0, 200.0, Severity::Warning),
        ];
        assert_eq!(resolver.actions_for(&alerts), resolver.bundle("tvoc"));
        assert_eq!(reasons_for(&alerts).len(), 2);
    }

    #[test]
    fn reason_format() {
        // ---
        let alerts = [
            alert("co2", 1300.0, 1200.0, Severity::Warning),
            alert("pm25", 35.1, 35.0, Severity::Warning),
            alert("humidity", 25.5, 30.0, Severity::Info),
        ];
        assert_eq!(
            reasons_for(&alerts),
            [
                "co2=1300.0 threshold=1200.0 (warning)",
                "pm25=35.1 threshold=35.0 (warning)",
                "humidity=25.5 threshold=30.0 (info)",
            ]
        );
    }
}
