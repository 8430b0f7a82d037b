//! Minute-keyed price lookup with nearest-timestamp fallback.
//!
//! A [`MinuteIndex`] is built per query batch from whatever (possibly date-filtered)
//! slice the caller holds; it is never cached across calls.

use indexmap::IndexMap;

use crate::{
    errors::{ImpactError, Result},
    models::{PricePoint, PriceSeries},
    time_align::floor_to_minute,
};

/// Floored minute → first price point seen in that minute.
///
/// Keeps a borrow of the full slice so lookups can fall back to the nearest point.
#[derive(Debug, Clone)]
pub struct MinuteIndex<'a> {
    series: &'a [PricePoint],
    by_minute: IndexMap<i64, &'a PricePoint>,
}

impl<'a> MinuteIndex<'a> {
    /// Index `series` by floored minute; on duplicates the first occurrence wins.
    pub fn build(series: &'a [PricePoint]) -> Self {
        let mut by_minute = IndexMap::with_capacity(series.len());
        for p in series {
            by_minute.entry(floor_to_minute(p.epoch_seconds)).or_insert(p);
        }
        Self { series, by_minute }
    }

    /// Exact lookup by the floored minute of `epoch_seconds`.
    pub fn get(&self, epoch_seconds: i64) -> Option<&'a PricePoint> {
        self.by_minute.get(&floor_to_minute(epoch_seconds)).copied()
    }

    /// Price at `target`'s minute, else the price of the nearest point in the full slice.
    ///
    /// Ties on distance resolve to the earliest point in slice order.
    pub fn price_at(&self, target: i64) -> Result<f64> {
        self.point_at(target).map(|p| p.price)
    }

    /// Like [`price_at`](Self::price_at) but returns the matched point.
    pub fn point_at(&self, target: i64) -> Result<&'a PricePoint> {
        if let Some(p) = self.get(target) {
            return Ok(p);
        }
        nearest(self.series, target).ok_or(ImpactError::EmptySeries)
    }

    /// Number of distinct minutes.
    pub fn len(&self) -> usize {
        self.by_minute.len()
    }

    /// True when the underlying slice is empty.
    pub fn is_empty(&self) -> bool {
        self.by_minute.is_empty()
    }

    /// Distinct-minute points in source order.
    pub fn points(&self) -> impl Iterator<Item = &'a PricePoint> + '_ {
        self.by_minute.values().copied()
    }
}

/// Point with the smallest `|epoch_seconds - target|`; first wins on ties.
pub fn nearest(series: &[PricePoint], target: i64) -> Option<&PricePoint> {
    series
        .iter()
        .min_by_key(|p| p.epoch_seconds.abs_diff(target))
}

/// Derived copy of `series` with one point per floored minute (first occurrence kept).
pub fn dedup_by_minute(series: &[PricePoint]) -> PriceSeries {
    MinuteIndex::build(series).points().copied().collect()
}
