//! Per-event price windows normalized to the price at the event's minute.
//!
//! For an event floored to minute `t` the window holds every candle in
//! `[t - spread, t + spread]`. Each is expressed as `price / anchor` against
//! signed hours from `t`. The anchor is the candle in minute `t`, or the
//! nearest candle inside the window when that minute is missing.

use serde::Serialize;

use crate::{
    errors::{ImpactError, Result},
    lookup::MinuteIndex,
    models::{NormalizedPoint, Peak, PricePoint, PriceSeries, Timestamped},
    time_align::{SECS_PER_HOUR, floor_to_minute},
};

/// Half-width used by the dashboard: six hours either side of a post.
pub const DEFAULT_SPREAD_SECS: i64 = 6 * SECS_PER_HOUR;

/// Normalized trajectory around a single event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventWindow {
    /// The event's floored minute (epoch seconds); `relative_hours == 0` here.
    pub event_minute: i64,
    /// Price every point was divided by.
    pub anchor_price: f64,
    /// Every candle in the window, pre-event, at-event and post-event, in time order.
    pub points: Vec<NormalizedPoint>,
    /// Highest strictly post-event point; `None` if the window ends at the event.
    pub peak: Option<Peak>,
}

/// Candles with `epoch_seconds` in `[center - spread, center + spread]`.
pub fn slice_around(series: &PriceSeries, center: i64, spread_seconds: i64) -> &[PricePoint] {
    slice_between(
        series,
        center.saturating_sub(spread_seconds),
        center.saturating_add(spread_seconds),
    )
}

/// Candles with `lo <= epoch_seconds <= hi`; empty when `lo > hi`.
pub fn slice_between(series: &PriceSeries, lo: i64, hi: i64) -> &[PricePoint] {
    let start = series.partition_point(|p| p.epoch_seconds < lo);
    let end = series.partition_point(|p| p.epoch_seconds <= hi);
    if end <= start {
        return &[];
    }
    &series[start..end]
}

/// Build the normalized window for one event.
///
/// Returns `Ok(None)` when no candle falls inside the window, and
/// [`ImpactError::DivisionByZeroPrice`] when the anchor price is zero.
pub fn window_for<E: Timestamped>(
    event: &E,
    series: &PriceSeries,
    spread_seconds: i64,
) -> Result<Option<EventWindow>> {
    let t = floor_to_minute(event.epoch_seconds());
    let slice = slice_around(series, t, spread_seconds);
    if slice.is_empty() {
        return Ok(None);
    }

    let anchor_price = MinuteIndex::build(slice).price_at(t)?;
    if anchor_price == 0.0 {
        return Err(ImpactError::DivisionByZeroPrice { event_minute: t });
    }

    let points: Vec<NormalizedPoint> = slice
        .iter()
        .map(|p| NormalizedPoint {
            relative_hours: (p.epoch_seconds - t) as f64 / SECS_PER_HOUR as f64,
            normalized_price: p.price / anchor_price,
        })
        .collect();
    let peak = post_event_peak(points.iter().map(|p| (p.relative_hours, p.normalized_price)));

    Ok(Some(EventWindow {
        event_minute: t,
        anchor_price,
        points,
        peak,
    }))
}

/// Maximum value among `(relative_hours, value)` pairs with `relative_hours > 0`.
///
/// On ties the earliest pair wins.
pub(crate) fn post_event_peak(pairs: impl Iterator<Item = (f64, f64)>) -> Option<Peak> {
    pairs
        .filter(|(h, _)| *h > 0.0)
        .fold(None, |best: Option<Peak>, (relative_hours, value)| match best {
            Some(b) if b.value >= value => Some(b),
            _ => Some(Peak {
                relative_hours,
                value,
            }),
        })
}
