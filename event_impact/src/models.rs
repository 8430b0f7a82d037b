//! Canonical in-memory records shared by every stage of the engine.
//!
//! The loader boundary turns tabular input into these typed records; nothing
//! past this module looks at column names.

use std::ops::Deref;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Anything keyed by a whole epoch second (UTC).
pub trait Timestamped {
    /// Seconds since 1970-01-01T00:00:00Z.
    fn epoch_seconds(&self) -> i64;
}

/// One candle's opening price at a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Candle open time, epoch seconds (UTC).
    pub epoch_seconds: i64,
    /// Opening price.
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub const fn new(epoch_seconds: i64, price: f64) -> Self {
        Self {
            epoch_seconds,
            price,
        }
    }
}

impl Timestamped for PricePoint {
    fn epoch_seconds(&self) -> i64 {
        self.epoch_seconds
    }
}

/// Price points in ascending `epoch_seconds` order.
///
/// Construction stable-sorts the input, so points sharing a timestamp keep
/// their source order (the minute index relies on "first seen wins").
/// Duplicate minutes are allowed here; see
/// [`lookup::dedup_by_minute`](crate::lookup::dedup_by_minute).
///
/// Serializes as a plain array; deserializing goes through [`PriceSeries::new`]
/// so loader input in any order comes out sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by timestamp if needed.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        if !points.is_sorted_by_key(|p| p.epoch_seconds) {
            points.sort_by_key(|p| p.epoch_seconds);
        }
        Self { points }
    }

    /// Borrow the points as a slice.
    pub fn as_slice(&self) -> &[PricePoint] {
        &self.points
    }

    /// Consume the series.
    pub fn into_inner(self) -> Vec<PricePoint> {
        self.points
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<PricePoint>::deserialize(deserializer).map(Self::new)
    }
}

impl Deref for PriceSeries {
    type Target = [PricePoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl From<Vec<PricePoint>> for PriceSeries {
    fn from(points: Vec<PricePoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A timestamped social-media post.
///
/// The payload is carried through untouched; several events may share a
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPoint<P> {
    /// Post creation time, epoch seconds (UTC).
    pub epoch_seconds: i64,
    /// Display/hover metadata.
    pub payload: P,
}

impl<P> EventPoint<P> {
    /// Create a new event.
    pub const fn new(epoch_seconds: i64, payload: P) -> Self {
        Self {
            epoch_seconds,
            payload,
        }
    }
}

impl<P> Timestamped for EventPoint<P> {
    fn epoch_seconds(&self) -> i64 {
        self.epoch_seconds
    }
}

/// Text access used by keyword filters.
pub trait PostText {
    /// Main body of the post, if any.
    fn primary_text(&self) -> Option<&str>;

    /// Text of a quoted post, if this post quotes one.
    fn quoted_text(&self) -> Option<&str> {
        None
    }
}

/// Default payload: post text plus arbitrary ordered metadata columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Full post text; `None` when the source cell was empty.
    pub text: Option<String>,
    /// Text of the quoted post, for quote-reposts.
    pub quoted_text: Option<String>,
    /// Passthrough columns (id, url, counts, ...) in source order.
    pub metadata: IndexMap<String, String>,
}

impl Post {
    /// A post carrying only text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

impl PostText for Post {
    fn primary_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn quoted_text(&self) -> Option<&str> {
        self.quoted_text.as_deref()
    }
}

/// One price observation inside an event window, normalized to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// Signed offset from the event's floored minute, in hours.
    pub relative_hours: f64,
    /// `price / anchor_price`.
    pub normalized_price: f64,
}

/// Highest post-event value of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Where the peak occurs (strictly positive).
    pub relative_hours: f64,
    /// Peak normalized price.
    pub value: f64,
}

/// One bucket of the mean impact curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Bucket key, rounded to the aggregation precision.
    pub relative_hours: f64,
    /// Mean normalized price of every observation in the bucket.
    pub mean_normalized_price: f64,
}

/// Cross-event mean trajectory and its post-event peak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactCurve {
    /// Buckets in strictly increasing `relative_hours` order.
    pub points: Vec<CurvePoint>,
    /// Maximum over buckets with `relative_hours > 0`.
    pub peak: Option<Peak>,
}

impl ImpactCurve {
    /// The curve produced from no input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there are no buckets.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_sorts_and_keeps_source_order_for_equal_timestamps() {
        let s = PriceSeries::new(vec![
            PricePoint::new(120, 3.0),
            PricePoint::new(60, 1.0),
            PricePoint::new(60, 2.0),
        ]);
        let prices: Vec<f64> = s.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn post_text_accessors() {
        let mut p = Post::with_text("to the moon");
        p.quoted_text = Some("Dogecoin".into());
        assert_eq!(p.primary_text(), Some("to the moon"));
        assert_eq!(p.quoted_text(), Some("Dogecoin"));
        assert_eq!(Post::default().primary_text(), None);
    }

    #[test]
    fn deserialized_series_is_sorted() {
        let s: PriceSeries = serde_json::from_str(
            r#"[{"epoch_seconds":25200,"price":2.0},{"epoch_seconds":0,"price":1.0}]"#,
        )
        .unwrap();
        let ts: Vec<i64> = s.iter().map(|p| p.epoch_seconds).collect();
        assert_eq!(ts, vec![0, 25200]);
    }

    #[test]
    fn series_serializes_as_plain_array() {
        let s: PriceSeries = vec![PricePoint::new(60, 1.5)].into();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"[{"epoch_seconds":60,"price":1.5}]"#);
    }
}
