use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chart::ChartData;
use crate::stats::{nearest_rank, sorted_finite, summarize};

/// Lead time or cycle time observations, in days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationSeries {
    pub data: Vec<f64>,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub p85: f64,
    pub p95: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DurationSeries {
    pub fn from_durations(data: Vec<f64>) -> Self {
        let Some(summary) = summarize(&data) else {
            return Self {
                data,
                ..Self::default()
            };
        };
        let sorted = sorted_finite(&data);
        Self {
            average: summary.average,
            median: summary.median,
            min: summary.min,
            max: summary.max,
            p85: nearest_rank(&sorted, 85).unwrap_or(summary.max),
            p95: nearest_rank(&sorted, 95).unwrap_or(summary.max),
            data,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughputPoint {
    /// Monday of the ISO week.
    pub period_start: NaiveDate,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSeries {
    pub data: Vec<ThroughputPoint>,
    pub average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ThroughputSeries {
    pub fn from_points(data: Vec<ThroughputPoint>) -> Self {
        let average = mean(data.iter().map(|p| p.count));
        Self {
            data,
            average,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipPoint {
    pub date: NaiveDate,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WipSeries {
    pub data: Vec<WipPoint>,
    pub average: f64,
    pub max: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WipSeries {
    pub fn from_points(data: Vec<WipPoint>) -> Self {
        let average = mean(data.iter().map(|p| p.count));
        let max = data.iter().map(|p| p.count).max().unwrap_or(0);
        Self {
            data,
            average,
            max,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// One day of the cumulative flow diagram. On the wire the per-status counts
/// sit next to `date`: `{ "date": "2024-01-02", "To Do": 3, "Done": 1 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfdPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: BTreeMap<String, u32>,
}

impl CfdPoint {
    pub fn count(&self, status: &str) -> u32 {
        self.counts.get(status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CfdSeries {
    pub data: Vec<CfdPoint>,
    /// Workflow order, earliest status first.
    pub statuses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CfdSeries {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

fn mean(values: impl Iterator<Item = u32>) -> f64 {
    let (sum, n) = values.fold((0u64, 0u64), |(s, n), v| (s + u64::from(v), n + 1));
    if n == 0 { 0.0 } else { sum as f64 / n as f64 }
}

impl ChartData for DurationSeries {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn primary_len(&self) -> usize {
        self.data.len()
    }
}

impl ChartData for ThroughputSeries {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn primary_len(&self) -> usize {
        self.data.len()
    }
}

impl ChartData for WipSeries {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn primary_len(&self) -> usize {
        self.data.len()
    }
}

impl ChartData for CfdSeries {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn primary_len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_summary_uses_nearest_rank() {
        let s = DurationSeries::from_durations(vec![7.0, 2.0, 10.0, 5.0, 4.0, 5.0]);
        assert_eq!(s.median, 5.0);
        assert_eq!(s.p85, 10.0);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 10.0);
        // insertion order of the raw observations is preserved
        assert_eq!(s.data[0], 7.0);
    }

    #[test]
    fn empty_durations_are_ready_but_empty() {
        let s = DurationSeries::from_durations(Vec::new());
        assert!(s.error.is_none());
        assert_eq!(s.primary_len(), 0);
    }

    #[test]
    fn errored_series_round_trips_error_field() {
        let s = DurationSeries::failed("tracker unreachable");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["error"], "tracker unreachable");

        let ok = serde_json::to_value(DurationSeries::from_durations(vec![1.0])).unwrap();
        assert!(ok.get("error").is_none());
    }

    #[test]
    fn cfd_point_flattens_status_counts() {
        let raw = r#"{"date":"2024-03-04","To Do":3,"Done":1}"#;
        let p: CfdPoint = serde_json::from_str(raw).unwrap();
        assert_eq!(p.count("To Do"), 3);
        assert_eq!(p.count("Done"), 1);
        assert_eq!(p.count("Review"), 0);
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn wip_and_throughput_averages() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let wip = WipSeries::from_points(vec![
            WipPoint { date: d, count: 2 },
            WipPoint { date: d.succ_opt().unwrap(), count: 5 },
        ]);
        assert_eq!(wip.max, 5);
        assert!((wip.average - 3.5).abs() < 1e-9);

        let tp = ThroughputSeries::from_points(Vec::new());
        assert_eq!(tp.average, 0.0);
    }
}
