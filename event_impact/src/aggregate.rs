//! Cross-event mean impact curve.
//!
//! Every window's points are bucketed by `relative_hours` rounded to a fixed
//! number of decimals (absorbing float drift between events), averaged per
//! bucket, and scanned for the highest strictly post-event bucket.
//!
//! Buckets keep running `(sum, count)` pairs rather than the raw points, so
//! partial accumulators built on different threads can be merged in any order.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    models::{CurvePoint, ImpactCurve, NormalizedPoint},
    window::post_event_peak,
};

/// Rounding precision for bucket keys.
pub const DEFAULT_BUCKET_DECIMALS: u32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Bucket {
    sum: f64,
    count: usize,
}

/// Incremental builder for an [`ImpactCurve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactAccumulator {
    decimals: u32,
    scale: f64,
    buckets: BTreeMap<i64, Bucket>,
    windows: usize,
}

impl Default for ImpactAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_DECIMALS)
    }
}

impl ImpactAccumulator {
    /// Empty accumulator rounding bucket keys to `decimals` places.
    pub fn new(decimals: u32) -> Self {
        Self {
            decimals,
            scale: 10f64.powi(decimals as i32),
            buckets: BTreeMap::new(),
            windows: 0,
        }
    }

    /// Add one event's normalized window.
    pub fn push(&mut self, window: &[NormalizedPoint]) {
        for p in window {
            let b = self.buckets.entry(self.key(p.relative_hours)).or_default();
            b.sum += p.normalized_price;
            b.count += 1;
        }
        self.windows += 1;
    }

    /// Combine two accumulators built with the same precision.
    pub fn merge(mut self, other: Self) -> Self {
        debug_assert_eq!(self.decimals, other.decimals, "merging mismatched precisions");
        for (k, b) in other.buckets {
            let mine = self.buckets.entry(k).or_default();
            mine.sum += b.sum;
            mine.count += b.count;
        }
        self.windows += other.windows;
        self
    }

    /// Number of windows pushed so far (including merged ones).
    pub fn windows(&self) -> usize {
        self.windows
    }

    /// Produce the mean curve and its post-event peak.
    pub fn finish(self) -> ImpactCurve {
        let points: Vec<CurvePoint> = self
            .buckets
            .iter()
            .map(|(&k, b)| CurvePoint {
                relative_hours: k as f64 / self.scale,
                mean_normalized_price: b.sum / b.count as f64,
            })
            .collect();
        let peak = post_event_peak(
            points
                .iter()
                .map(|p| (p.relative_hours, p.mean_normalized_price)),
        );
        debug!(
            windows = self.windows,
            buckets = points.len(),
            "aggregated impact curve"
        );
        ImpactCurve { points, peak }
    }

    fn key(&self, relative_hours: f64) -> i64 {
        (relative_hours * self.scale).round() as i64
    }
}

/// Mean impact curve at the default precision.
pub fn aggregate<W: AsRef<[NormalizedPoint]>>(windows: &[W]) -> ImpactCurve {
    aggregate_with_precision(windows, DEFAULT_BUCKET_DECIMALS)
}

/// Mean impact curve with bucket keys rounded to `decimals` places.
pub fn aggregate_with_precision<W: AsRef<[NormalizedPoint]>>(
    windows: &[W],
    decimals: u32,
) -> ImpactCurve {
    let mut acc = ImpactAccumulator::new(decimals);
    for w in windows {
        acc.push(w.as_ref());
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Peak;

    fn np(relative_hours: f64, normalized_price: f64) -> NormalizedPoint {
        NormalizedPoint {
            relative_hours,
            normalized_price,
        }
    }

    #[test]
    fn empty_input_is_empty_curve() {
        let none: [Vec<NormalizedPoint>; 0] = [];
        assert_eq!(aggregate(&none), ImpactCurve::empty());
    }

    #[test]
    fn opposite_moves_average_out() {
        let curve = aggregate(&[vec![np(1.0, 1.1)], vec![np(1.0, 0.9)]]);
        assert_eq!(curve.points.len(), 1);
        assert_eq!(curve.points[0].relative_hours, 1.0);
        assert!((curve.points[0].mean_normalized_price - 1.0).abs() < 1e-12);
        let peak = curve.peak.unwrap();
        assert_eq!(peak.relative_hours, 1.0);
        assert!((peak.value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn float_drift_collapses_into_one_bucket() {
        let curve = aggregate(&[vec![np(0.1 + 0.2, 1.0)], vec![np(0.3, 3.0)]]);
        assert_eq!(curve.points.len(), 1);
        assert_eq!(curve.points[0].relative_hours, 0.3);
        assert_eq!(curve.points[0].mean_normalized_price, 2.0);
    }

    #[test]
    fn peak_ignores_pre_event_and_zero_buckets() {
        let curve = aggregate(&[vec![np(-1.0, 5.0), np(0.0, 1.0), np(0.5, 1.2), np(1.0, 1.1)]]);
        assert_eq!(
            curve.peak,
            Some(Peak {
                relative_hours: 0.5,
                value: 1.2
            })
        );
        let only_pre = aggregate(&[vec![np(-1.0, 5.0), np(0.0, 1.0)]]);
        assert_eq!(only_pre.peak, None);
        assert_eq!(only_pre.points.len(), 2);
    }

    #[test]
    fn merge_matches_sequential_push() {
        let a = vec![np(-0.5, 0.9), np(0.5, 1.1)];
        let b = vec![np(0.5, 1.3), np(1.0, 1.0)];

        let mut left = ImpactAccumulator::default();
        left.push(&a);
        let mut right = ImpactAccumulator::default();
        right.push(&b);
        let merged = right.merge(left);
        assert_eq!(merged.windows(), 2);

        assert_eq!(merged.finish(), aggregate(&[a, b]));
    }

    #[test]
    fn snapshot_curve_json() {
        let curve = aggregate(&[vec![np(-0.5, 0.5), np(0.5, 1.25)], vec![np(0.5, 2.25)]]);
        insta::assert_json_snapshot!(curve, @r#"
        {
          "points": [
            {
              "relative_hours": -0.5,
              "mean_normalized_price": 0.5
            },
            {
              "relative_hours": 0.5,
              "mean_normalized_price": 1.75
            }
          ],
          "peak": {
            "relative_hours": 0.5,
            "value": 1.75
          }
        }
        "#);
    }
}
