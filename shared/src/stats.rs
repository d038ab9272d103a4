// shared/src/stats.rs
//
// Histogram bucketing and nearest-rank percentile math for duration charts.
// Everything here is a pure function over slices.

use serde::{Deserialize, Serialize};

/// Bucket width (days) used by every duration histogram.
pub const DEFAULT_BUCKET_WIDTH: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub count: u32,
}

/// Group `values` into fixed-width buckets labelled `"{start}-{start+width}"`.
///
/// Buckets come out in the order their label is first seen in `values`, not in
/// numeric order. Non-finite values are skipped and a zero width yields no
/// buckets.
pub fn distribution_buckets(values: &[f64], width: u32) -> Vec<Bucket> {
    if width == 0 {
        return Vec::new();
    }

    let mut out: Vec<Bucket> = Vec::new();
    for &v in values {
        if !v.is_finite() {
            continue;
        }
        let label = bucket_label(v, width);
        match out.iter_mut().find(|b| b.label == label) {
            Some(b) => b.count += 1,
            None => out.push(Bucket { label, count: 1 }),
        }
    }
    out
}

/// Lower edge of the bucket `v` falls into.
///
/// Values beyond the `i64` range land in the outermost bucket whose upper edge
/// is still representable.
pub fn bucket_start(v: f64, width: u32) -> i64 {
    let w = i64::from(width.max(1));
    let limit = i64::MAX / w - 1;
    ((v / w as f64).floor() as i64).clamp(-limit, limit) * w
}

/// Label of the bucket `v` falls into.
pub fn bucket_label(v: f64, width: u32) -> String {
    let start = bucket_start(v, width);
    format!("{}-{}", start, start + i64::from(width.max(1)))
}

/// Nearest-rank percentile: the element at `ceil(percent / 100 * n) - 1`.
///
/// `sorted` must be ascending. The index is computed in integer arithmetic so
/// that e.g. 95% of 20 lands on rank 19 exactly.
pub fn nearest_rank(sorted: &[f64], percent: u32) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let scaled = percent as usize * n;
    let rank = scaled.div_ceil(100);
    let idx = rank.saturating_sub(1).min(n - 1);
    sorted.get(idx).copied()
}

/// Sort a copy of `values` ascending, dropping non-finite entries.
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    v.sort_by(f64::total_cmp);
    v
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercentileBand {
    #[serde(rename = "within_50th")]
    Within50th,
    #[serde(rename = "50th_to_85th")]
    From50thTo85th,
    #[serde(rename = "85th_to_95th")]
    From85thTo95th,
    #[serde(rename = "above_95th")]
    Above95th,
}

impl PercentileBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            PercentileBand::Within50th => "within_50th",
            PercentileBand::From50thTo85th => "50th_to_85th",
            PercentileBand::From85thTo95th => "85th_to_95th",
            PercentileBand::Above95th => "above_95th",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileCuts {
    pub median: f64,
    pub p85: f64,
    pub p95: f64,
}

impl PercentileCuts {
    /// Cut points of an ascending slice; `None` when it is empty.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        Some(Self {
            median: nearest_rank(sorted, 50)?,
            p85: nearest_rank(sorted, 85)?,
            p95: nearest_rank(sorted, 95)?,
        })
    }

    pub fn band(&self, v: f64) -> PercentileBand {
        if v <= self.median {
            PercentileBand::Within50th
        } else if v <= self.p85 {
            PercentileBand::From50thTo85th
        } else if v <= self.p95 {
            PercentileBand::From85thTo95th
        } else {
            PercentileBand::Above95th
        }
    }
}

/// Share of `values` that are `<= v`, as a percentage rounded to one decimal.
pub fn cumulative_percentage(values: &[f64], v: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let at_or_below = values.iter().filter(|&&x| x <= v).count();
    let pct = at_or_below as f64 / values.len() as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summarize(values: &[f64]) -> Option<Summary> {
    let sorted = sorted_finite(values);
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let average = sorted.iter().sum::<f64>() / sorted.len() as f64;
    Some(Summary {
        average,
        median: nearest_rank(&sorted, 50)?,
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [f64; 6] = [2.0, 4.0, 5.0, 5.0, 7.0, 10.0];

    #[test]
    fn buckets_sample_by_width_five() {
        let buckets = distribution_buckets(&SAMPLE, DEFAULT_BUCKET_WIDTH);
        let pairs: Vec<(&str, u32)> = buckets.iter().map(|b| (b.label.as_str(), b.count)).collect();
        assert_eq!(pairs, vec![("0-5", 2), ("5-10", 3), ("10-15", 1)]);
    }

    #[test]
    fn buckets_keep_first_seen_order() {
        let buckets = distribution_buckets(&[12.0, 1.0, 13.5, 6.0, 0.5], 5);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["10-15", "0-5", "5-10"]);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].count, 2);
    }

    #[test]
    fn bucket_counts_cover_every_value() {
        let values: Vec<f64> = (0..200).map(|i| (i * 37 % 101) as f64 / 3.0).collect();
        for width in [1, 3, 5, 7, 30] {
            let total: u32 = distribution_buckets(&values, width).iter().map(|b| b.count).sum();
            assert_eq!(total as usize, values.len(), "width {width}");
        }
    }

    #[test]
    fn huge_durations_fall_into_the_last_bucket() {
        let buckets = distribution_buckets(&[2.0, 1e19, f64::MAX], 5);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "0-5");
        assert_eq!(buckets[1].count, 2);

        let start = bucket_start(1e19, 5);
        assert!(start > 0);
        assert_eq!(bucket_label(1e19, 5), format!("{}-{}", start, start + 5));
        assert!(bucket_start(-1e19, 5) < 0);
    }

    #[test]
    fn buckets_are_repeatable() {
        assert_eq!(distribution_buckets(&SAMPLE, 5), distribution_buckets(&SAMPLE, 5));
    }

    #[test]
    fn buckets_skip_non_finite_and_zero_width() {
        assert_eq!(distribution_buckets(&[f64::NAN, 1.0], 5).len(), 1);
        assert!(distribution_buckets(&SAMPLE, 0).is_empty());
        assert!(distribution_buckets(&[], 5).is_empty());
    }

    #[test]
    fn fractional_values_floor_into_bucket() {
        assert_eq!(bucket_label(4.99, 5), "0-5");
        assert_eq!(bucket_label(0.0, 5), "0-5");
        assert_eq!(bucket_label(15.2, 5), "15-20");
        assert_eq!(bucket_start(-0.5, 5), -5);
    }

    #[test]
    fn nearest_rank_cut_points() {
        let cuts = PercentileCuts::from_sorted(&SAMPLE).unwrap();
        assert_eq!(cuts.median, 5.0);
        assert_eq!(cuts.p85, 10.0);
        assert_eq!(cuts.p95, 10.0);
    }

    #[test]
    fn nearest_rank_exact_boundary() {
        let sorted: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(nearest_rank(&sorted, 95), Some(19.0));
        assert_eq!(nearest_rank(&sorted, 50), Some(10.0));
        assert_eq!(nearest_rank(&sorted, 100), Some(20.0));
        assert_eq!(nearest_rank(&sorted, 0), Some(1.0));
        assert_eq!(nearest_rank(&[], 50), None);
    }

    #[test]
    fn bands_follow_cut_points() {
        let cuts = PercentileCuts {
            median: 5.0,
            p85: 8.0,
            p95: 12.0,
        };
        assert_eq!(cuts.band(5.0), PercentileBand::Within50th);
        assert_eq!(cuts.band(6.0), PercentileBand::From50thTo85th);
        assert_eq!(cuts.band(12.0), PercentileBand::From85thTo95th);
        assert_eq!(cuts.band(12.5).as_str(), "above_95th");
    }

    #[test]
    fn band_serializes_with_display_labels() {
        let json = serde_json::to_string(&PercentileBand::From50thTo85th).unwrap();
        assert_eq!(json, "\"50th_to_85th\"");
    }

    #[test]
    fn cumulative_percentage_rounds_to_one_decimal() {
        assert_eq!(cumulative_percentage(&SAMPLE, 5.0), 66.7);
        assert_eq!(cumulative_percentage(&SAMPLE, 10.0), 100.0);
        assert_eq!(cumulative_percentage(&SAMPLE, 1.0), 0.0);
        assert_eq!(cumulative_percentage(&[], 3.0), 0.0);
    }

    #[test]
    fn summary_of_sample() {
        let s = summarize(&SAMPLE).unwrap();
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 10.0);
        assert_eq!(s.median, 5.0);
        assert!((s.average - 5.5).abs() < 1e-9);
        assert!(summarize(&[]).is_none());
    }
}
