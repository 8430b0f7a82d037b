#![allow(dead_code)]

use event_impact::{
    models::{EventPoint, Post, PricePoint, PriceSeries},
    store::Dataset,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// 2024-01-01T00:00:00Z
pub const T0: i64 = 1704067200;

pub fn series(points: &[(i64, f64)]) -> PriceSeries {
    points.iter().map(|&(t, p)| PricePoint::new(t, p)).collect()
}

/// One candle per minute starting at `start`, prices taken from `prices`.
pub fn minute_series(start: i64, prices: &[f64]) -> PriceSeries {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::new(start + 60 * i as i64, p))
        .collect()
}

pub fn bare_events(epochs: &[i64]) -> Vec<EventPoint<()>> {
    epochs.iter().map(|&t| EventPoint::new(t, ())).collect()
}

pub fn post(epoch: i64, text: &str) -> EventPoint<Post> {
    EventPoint::new(epoch, Post::with_text(text))
}

/// A day of minute candles oscillating around 100 plus a handful of posts.
pub fn sample_dataset() -> Dataset<Post> {
    let prices = (0..24 * 60)
        .map(|m| 100.0 + ((m % 90) as f64 - 45.0) / 10.0)
        .collect::<Vec<_>>();
    Dataset {
        prices: minute_series(T0, &prices),
        events: vec![
            post(T0 + 3 * 3600 + 12, "Dogecoin is the people's crypto"),
            post(T0 + 9 * 3600, "rockets"),
            post(T0 + 15 * 3600 + 59, "doge doge doge"),
        ],
    }
}

pub struct TestConfig {
    _dir: TempDir, // keep alive for the life of the test
    pub path: PathBuf,
}

pub fn write_config(contents: &str) -> TestConfig {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("event_impact.toml");
    std::fs::write(&path, contents).expect("write config");
    TestConfig { _dir: dir, path }
}
