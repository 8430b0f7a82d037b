mod common;

use common::*;
use event_impact::{
    ImpactError,
    aggregate::aggregate,
    analysis::{DashboardQuery, QueryOutcome, analyze, run_query},
    config::{AnalysisConfig, load_config_path},
    joiner::average_price_at_events,
    lookup::MinuteIndex,
    models::{NormalizedPoint, PriceSeries},
    store::DatasetStore,
    window::window_for,
};

fn np(relative_hours: f64, normalized_price: f64) -> NormalizedPoint {
    NormalizedPoint {
        relative_hours,
        normalized_price,
    }
}

#[test]
fn events_join_on_their_floored_minute() {
    let prices = series(&[(T0, 100.0), (T0 + 60, 200.0), (T0 + 120, 300.0)]);
    let events = bare_events(&[T0 + 15, T0 + 45, T0 + 65]);

    let avg = average_price_at_events(&events, &prices);
    assert!((avg - 400.0 / 3.0).abs() < 1e-9);
}

#[test]
fn duplicate_minute_keeps_first_candle() {
    let prices = series(&[(T0, 100.0), (T0 + 10, 999.0)]);
    let events = bare_events(&[T0 + 5]);

    assert_eq!(average_price_at_events(&events, &prices), 100.0);
    assert_eq!(MinuteIndex::build(&prices).price_at(T0 + 5).unwrap(), 100.0);
}

#[test]
fn single_point_window_has_no_peak() {
    let prices = series(&[(T0, 42.0)]);
    let events = bare_events(&[T0 + 30]);

    let w = window_for(&events[0], &prices, 6 * 3600).unwrap().unwrap();
    assert_eq!(w.points, vec![np(0.0, 1.0)]);
    assert_eq!(w.peak, None);
}

#[test]
fn opposite_moves_average_to_flat() {
    let curve = aggregate(&[vec![np(1.0, 1.1)], vec![np(1.0, 0.9)]]);

    assert_eq!(curve.points.len(), 1);
    assert_eq!(curve.points[0].relative_hours, 1.0);
    assert!((curve.points[0].mean_normalized_price - 1.0).abs() < 1e-12);
    let peak = curve.peak.unwrap();
    assert_eq!(peak.relative_hours, 1.0);
    assert!((peak.value - 1.0).abs() < 1e-12);
}

#[test]
fn empty_inputs_fall_back_to_sentinels() {
    let prices = series(&[(T0, 1.0)]);
    let none = bare_events(&[]);

    assert_eq!(average_price_at_events(&none, &prices), 0.0);
    assert_eq!(average_price_at_events(&bare_events(&[T0]), &series(&[])), 0.0);
    assert!(aggregate::<Vec<NormalizedPoint>>(&[]).is_empty());
    assert_eq!(
        MinuteIndex::build(&series(&[])).price_at(T0),
        Err(ImpactError::EmptySeries)
    );
}

#[test]
fn joiner_misses_where_window_anchor_falls_back() {
    // Candle at 00:00 and 00:05, post at 00:02: the KPI finds nothing but the
    // window still anchors on the nearest candle.
    let prices = series(&[(T0, 10.0), (T0 + 300, 20.0)]);
    let events = bare_events(&[T0 + 120]);

    assert_eq!(average_price_at_events(&events, &prices), 0.0);

    let w = window_for(&events[0], &prices, 3600).unwrap().unwrap();
    assert_eq!(w.anchor_price, 10.0);
    assert_eq!(w.points.len(), 2);
}

#[test]
fn query_on_stored_dataset() {
    let store = DatasetStore::new(sample_dataset());
    let cfg = AnalysisConfig::default();
    let query = DashboardQuery {
        date_from: Some("2024-01-01".into()),
        date_to: Some("2024-01-02".into()),
        keyword: Some("doge".into()),
        ..DashboardQuery::default()
    };

    let QueryOutcome::Report(report) = run_query(&store.snapshot(), &query, &cfg).unwrap() else {
        panic!("expected a report");
    };
    assert_eq!(report.kpis.total_events, 2);
    assert_eq!(report.windows.len(), 2);
    assert!(report.skipped.is_empty());
    for w in &report.windows {
        let at_event = w
            .window
            .points
            .iter()
            .find(|p| p.relative_hours == 0.0)
            .unwrap();
        assert_eq!(at_event.normalized_price, 1.0);
    }
    // The 03:00 post is clipped at midnight; the 15:00 one spans the full twelve hours.
    assert_eq!(report.curve.points.len(), 12 * 60 + 1);

    let text = report.kpis.to_text();
    assert_eq!(text.total_events, "2");
}

#[test]
fn unfiltered_analysis_matches_query_without_keyword() {
    let ds = sample_dataset();
    let cfg = AnalysisConfig::default();
    let query = DashboardQuery {
        date_from: Some("2024-01-01".into()),
        date_to: Some("2024-01-02".into()),
        ..DashboardQuery::default()
    };

    let direct = analyze(&ds.prices, &ds.events, &cfg);
    assert_eq!(
        run_query(&ds, &query, &cfg).unwrap(),
        QueryOutcome::Report(direct)
    );
}

#[test]
fn config_file_drives_window_width() {
    let file = write_config("spread_hours = 1\nbucket_decimals = 2\n");
    let cfg = load_config_path(&file.path).unwrap();
    let ds = sample_dataset();

    let report = analyze(&ds.prices, &ds.events, &cfg);
    for w in &report.windows {
        assert_eq!(w.window.points.len(), 121);
        assert!(w.window.points.iter().all(|p| p.relative_hours.abs() <= 1.0));
    }
}

#[test]
fn loader_order_does_not_leak_into_windows() {
    let json = format!(
        r#"[{{"epoch_seconds":{},"price":2.0}},{{"epoch_seconds":{},"price":1.0}}]"#,
        T0 + 7 * 3600,
        T0
    );
    let prices: PriceSeries = serde_json::from_str(&json).unwrap();
    let events = bare_events(&[T0]);

    let w = window_for(&events[0], &prices, 6 * 3600).unwrap().unwrap();
    assert_eq!(w.points, vec![np(0.0, 1.0)]);
}
