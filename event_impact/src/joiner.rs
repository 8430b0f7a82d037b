//! Batch join of event timestamps against a price series at minute granularity.
//!
//! Matching is exact on the floored minute only. Unlike
//! [`MinuteIndex::price_at`](crate::lookup::MinuteIndex::price_at) there is no
//! nearest-point fallback here, so this KPI can under-match relative to the
//! per-event windows. Keep it that way: unifying the two would change
//! published KPI values.

use tracing::debug;

use crate::{
    lookup::MinuteIndex,
    models::{PricePoint, Timestamped},
};

/// Prices aligned to each event's minute; `None` where no candle shares the minute.
pub fn aligned_prices<E: Timestamped>(events: &[E], prices: &[PricePoint]) -> Vec<Option<f64>> {
    let index = MinuteIndex::build(prices);
    events
        .iter()
        .map(|e| index.get(e.epoch_seconds()).map(|p| p.price))
        .collect()
}

/// Mean price at event time.
///
/// Returns `0.0` when either input is empty or no event matches; that is the
/// "no data" sentinel, not an error.
pub fn average_price_at_events<E: Timestamped>(events: &[E], prices: &[PricePoint]) -> f64 {
    if events.is_empty() || prices.is_empty() {
        return 0.0;
    }
    let (sum, matched) = aligned_prices(events, prices)
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), price| (sum + price, n + 1));
    debug!(
        events = events.len(),
        matched,
        "joined events to minute candles"
    );
    if matched == 0 {
        0.0
    } else {
        sum / matched as f64
    }
}
