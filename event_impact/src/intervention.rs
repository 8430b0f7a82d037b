//! Pre/post periods around a single post, shaped for an external causal-impact model.
//!
//! Only the windowing lives here. The intervention is the post's floored
//! minute; the pre-period ends on it and the post-period starts one minute later.

use serde::Serialize;

use crate::{
    errors::{ImpactError, Result},
    models::{PricePoint, PriceSeries},
    time_align::{SECS_PER_MINUTE, floor_to_minute, to_calendar_string},
    window::slice_between,
};

/// Inclusive epoch-second interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    /// First second (inclusive).
    pub start: i64,
    /// Last second (inclusive).
    pub end: i64,
}

impl Period {
    /// Both bounds as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub fn to_calendar_strings(&self) -> Option<[String; 2]> {
        Some([to_calendar_string(self.start)?, to_calendar_string(self.end)?])
    }
}

/// Training (pre) and evaluation (post) periods for one intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterventionPeriods {
    /// Floored minute of the post.
    pub intervention: i64,
    /// `[intervention - minutes_before, intervention]`.
    pub pre: Period,
    /// `[intervention + 1 min, intervention + minutes_after]`.
    pub post: Period,
}

impl InterventionPeriods {
    /// Periods around `event_epoch`.
    ///
    /// `minutes_after` must be at least 1, otherwise the post-period would be empty.
    pub fn around(event_epoch: i64, minutes_before: u32, minutes_after: u32) -> Result<Self> {
        let intervention = floor_to_minute(event_epoch);
        let pre = Period {
            start: intervention - i64::from(minutes_before) * SECS_PER_MINUTE,
            end: intervention,
        };
        let post = Period {
            start: intervention + SECS_PER_MINUTE,
            end: intervention + i64::from(minutes_after) * SECS_PER_MINUTE,
        };
        if post.start > post.end {
            return Err(ImpactError::InvertedRange {
                from: post.start,
                to: post.end,
            });
        }
        Ok(Self {
            intervention,
            pre,
            post,
        })
    }

    /// Every candle from the start of the pre-period to the end of the post-period.
    pub fn slice<'a>(&self, series: &'a PriceSeries) -> &'a [PricePoint] {
        slice_between(series, self.pre.start, self.post.end)
    }

    /// The pre- and post-period candles separately.
    pub fn split<'a>(&self, series: &'a PriceSeries) -> (&'a [PricePoint], &'a [PricePoint]) {
        (
            slice_between(series, self.pre.start, self.pre.end),
            slice_between(series, self.post.start, self.post.end),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1704067200;

    #[test]
    fn periods_from_floored_minute() {
        let p = InterventionPeriods::around(T0 + 59, 30, 10).unwrap();
        assert_eq!(p.intervention, T0);
        assert_eq!(p.pre, Period { start: T0 - 1800, end: T0 });
        assert_eq!(p.post, Period { start: T0 + 60, end: T0 + 600 });
        assert_eq!(
            p.pre.to_calendar_strings().unwrap(),
            ["2023-12-31 23:30:00".to_string(), "2024-01-01 00:00:00".to_string()]
        );
    }

    #[test]
    fn zero_minutes_after_is_rejected() {
        assert_eq!(
            InterventionPeriods::around(T0, 5, 0).unwrap_err(),
            ImpactError::InvertedRange { from: T0 + 60, to: T0 }
        );
    }

    #[test]
    fn slices_minute_candles() {
        let s: PriceSeries = (-10..=10).map(|i| PricePoint::new(T0 + i * 60, i as f64)).collect();
        let p = InterventionPeriods::around(T0 + 5, 3, 2).unwrap();
        assert_eq!(p.slice(&s).len(), 6);
        let (pre, post) = p.split(&s);
        assert_eq!(pre.iter().map(|c| c.price).collect::<Vec<_>>(), vec![-3.0, -2.0, -1.0, 0.0]);
        assert_eq!(post.iter().map(|c| c.price).collect::<Vec<_>>(), vec![1.0, 2.0]);
    }
}
