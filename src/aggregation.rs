//! Zip-level trend aggregation.
//!
//! Summaries are recomputed from the supplied rows on every call; nothing is
//! cached between calls. Rows are fetched by the store and passed in, which
//! keeps the grouping logic independent of the database.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---

/// One household reading tagged with its household's zipcode.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipReadingRow {
    // ---
    pub zipcode: String,
    pub timestamp: DateTime<Utc>,
    pub pm25: Option<f64>,
    pub co2: Option<f64>,
    pub voc: Option<f64>,
    pub humidity: Option<f64>,
}

/// Mean of each metric over the non-null values of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricAverages {
    pub pm25: Option<f64>,
    pub co2: Option<f64>,
    pub voc: Option<f64>,
    pub humidity: Option<f64>,
}

/// Anonymized summary of the readings seen for one zipcode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipTrendSummary {
    // ---
    pub zipcode: String,
    /// Number of rows, including rows where every metric is null.
    pub reading_count: i64,
    pub averages: MetricAverages,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Running sum and count of the non-null values of one metric.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    // ---
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

#[derive(Debug, Default)]
struct ZipGroup {
    rows: i64,
    pm25: Mean,
    co2: Mean,
    voc: Mean,
    humidity: Mean,
    last_updated: Option<DateTime<Utc>>,
}

impl ZipGroup {
    // ---
    fn push(&mut self, row: &ZipReadingRow) {
        self.rows += 1;
        self.pm25.push(row.pm25);
        self.co2.push(row.co2);
        self.voc.push(row.voc);
        self.humidity.push(row.humidity);
        self.last_updated = self.last_updated.max(Some(row.timestamp));
    }

    fn into_summary(self, zipcode: String) -> ZipTrendSummary {
        ZipTrendSummary {
            zipcode,
            reading_count: self.rows,
            averages: MetricAverages {
                pm25: self.pm25.value(),
                co2: self.co2.value(),
                voc: self.voc.value(),
                humidity: self.humidity.value(),
            },
            last_updated: self.last_updated,
        }
    }
}

/// Group rows with `timestamp >= since` by zipcode.
///
/// Output is ordered by `reading_count` descending, then zipcode ascending.
pub fn zip_trends<I>(rows: I, since: DateTime<Utc>) -> Vec<ZipTrendSummary>
where
    I: IntoIterator<Item = ZipReadingRow>,
{
    // ---
    let mut groups: BTreeMap<String, ZipGroup> = BTreeMap::new();

    for row in rows.into_iter().filter(|r| r.timestamp >= since) {
        match groups.get_mut(&row.zipcode) {
            Some(group) => group.push(&row),
            None => {
                let mut group = ZipGroup::default();
                group.push(&row);
                groups.insert(row.zipcode, group);
            }
        }
    }

    let mut summaries: Vec<_> = groups
        .into_iter()
        .map(|(zipcode, group)| group.into_summary(zipcode))
        .collect();

    // BTreeMap already yields zipcodes ascending; a stable sort keeps that for ties.
    summaries.sort_by(|a, b| b.reading_count.cmp(&a.reading_count));
    summaries
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 27, 12, 0, 0).unwrap()
    }

    fn row(zipcode: &str, minutes: i64, pm25: Option<f64>) -> ZipReadingRow {
        ZipReadingRow {
            zipcode: zipcode.to_string(),
            timestamp: base() + Duration::minutes(minutes),
            pm25,
            co2: None,
            voc: None,
            humidity: None,
        }
    }

    #[test]
    fn groups_and_averages_non_null_values() {
        // ---
        let rows = vec![
            row("11201", 5, Some(30.0)),
            row("10001", 0, Some(10.0)),
            row("10001", 10, Some(20.0)),
            row("10001", 20, None),
        ];
        let trends = zip_trends(rows, base());

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].zipcode, "10001");
        assert_eq!(trends[0].reading_count, 3);
        assert_eq!(trends[0].averages.pm25, Some(15.0));
        assert_eq!(trends[0].averages.co2, None);
        assert_eq!(trends[0].last_updated, Some(base() + Duration::minutes(20)));

        assert_eq!(trends[1].zipcode, "11201");
        assert_eq!(trends[1].reading_count, 1);
        assert_eq!(trends[1].averages.pm25, Some(30.0));
    }

    #[test]
    fn rows_before_window_are_ignored() {
        // ---
        let rows = vec![row("10001", -1, Some(100.0)), row("10001", 0, Some(10.0))];
        let trends = zip_trends(rows, base());
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].reading_count, 1);
        assert_eq!(trends[0].averages.pm25, Some(10.0));
    }

    #[test]
    fn empty_window_gives_no_summaries() {
        // ---
        assert!(zip_trends(Vec::new(), base()).is_empty());
        let stale = vec![row("10001", -60, Some(5.0))];
        assert!(zip_trends(stale, base()).is_empty());
    }

    #[test]
    fn all_null_metric_averages_to_none() {
        // ---
        let trends = zip_trends(vec![row("10001", 0, None), row("10001", 1, None)], base());
        assert_eq!(trends[0].reading_count, 2);
        assert_eq!(trends[0].averages, MetricAverages::default());
    }

    #[test]
    fn ties_ordered_by_zipcode() {
        // ---
        let rows = vec![
            row("11375", 0, None),
            row("10001", 0, None),
            row("10451", 0, None),
            row("10451", 1, None),
        ];
        let zips: Vec<_> = zip_trends(rows, base())
            .into_iter()
            .map(|t| t.zipcode)
            .collect();
        assert_eq!(zips, ["10451", "10001", "11375"]);
    }

    #[test]
    fn each_metric_averaged_independently() {
        // ---
        let rows = vec![
            ZipReadingRow {
                zipcode: "10001".into(),
                timestamp: base(),
                pm25: Some(12.0),
                co2: Some(800.0),
                voc: None,
                humidity: Some(40.0),
            },
            ZipReadingRow {
                zipcode: "10001".into(),
                timestamp: base(),
                pm25: None,
                co2: Some(1000.0),
                voc: Some(150.0),
                humidity: Some(50.0),
            },
        ];
        let averages = zip_trends(rows, base())[0].averages;
        assert_eq!(averages.pm25, Some(12.0));
        assert_eq!(averages.co2, Some(900.0));
        assert_eq!(averages.voc, Some(150.0));
        assert_eq!(averages.humidity, Some(45.0));
    }

    #[test]
    fn summary_serializes_with_nulls() {
        // ---
        let trends = zip_trends(vec![row("10001", 0, Some(8.0))], base());
        let json = serde_json::to_value(&trends).unwrap();
        assert_eq!(json[0]["zipcode"], "10001");
        assert_eq!(json[0]["averages"]["pm25"], 8.0);
        assert!(json[0]["averages"]["voc"].is_null());
    }
}
