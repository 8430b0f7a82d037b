//! End-to-end pipeline: filter, KPIs, per-post windows, and the mean impact curve.
//!
//! Every call is independent. Inputs are borrowed, outputs are freshly owned, and
//! no state survives between calls, so concurrent requests need no locking.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    aggregate::ImpactAccumulator,
    config::AnalysisConfig,
    errors::Result,
    filter::{
        before, matching_any_keyword_with_quote, matching_keyword, prices_within, within_range,
    },
    joiner::average_price_at_events,
    kpi::{KpiSummary, average_price},
    models::{EventPoint, ImpactCurve, Peak, PostText, PriceSeries, Timestamped},
    store::Dataset,
    window::{EventWindow, window_for},
};

/// Normalized window of one post, tagged with the post's position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventImpact {
    /// Index into the event slice passed to [`analyze`].
    pub event_index: usize,
    /// The post's own timestamp (not floored).
    pub event_epoch: i64,
    /// Normalized trajectory and its peak.
    pub window: EventWindow,
}

/// A post whose window could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEvent {
    /// Index into the event slice passed to [`analyze`].
    pub event_index: usize,
    /// Why it was skipped.
    pub reason: String,
}

/// Everything the rendering layer needs for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    /// Headline numbers.
    pub kpis: KpiSummary,
    /// One entry per post with price data around it, in input order.
    pub windows: Vec<EventImpact>,
    /// Per-post peaks, in the same order as `windows` (posts without one omitted).
    pub peaks: Vec<Peak>,
    /// Cross-post mean trajectory.
    pub curve: ImpactCurve,
    /// Posts dropped because normalization failed.
    pub skipped: Vec<SkippedEvent>,
}

/// Run the full analysis on already-filtered inputs.
///
/// Posts with no candles in their window are left out silently; posts whose
/// anchor price is zero are logged and listed in [`ImpactReport::skipped`].
/// Neither aborts the remaining posts.
pub fn analyze<E: Timestamped + Sync>(
    prices: &PriceSeries,
    events: &[E],
    cfg: &AnalysisConfig,
) -> ImpactReport {
    let kpis = KpiSummary {
        total_events: events.len(),
        average_price: average_price(prices),
        average_price_at_events: average_price_at_events(events, prices),
    };

    let mut windows = Vec::new();
    let mut peaks = Vec::new();
    let mut skipped = Vec::new();
    let mut acc = ImpactAccumulator::new(cfg.bucket_decimals);

    for (event_index, outcome) in compute_windows(events, prices, cfg.spread_seconds())
        .into_iter()
        .enumerate()
    {
        match outcome {
            Ok(Some(window)) => {
                acc.push(&window.points);
                if let Some(p) = window.peak {
                    peaks.push(p);
                }
                windows.push(EventImpact {
                    event_index,
                    event_epoch: events[event_index].epoch_seconds(),
                    window,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(event_index, error = %e, "skipping event");
                skipped.push(SkippedEvent {
                    event_index,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        events = events.len(),
        windows = windows.len(),
        skipped = skipped.len(),
        "computed event windows"
    );

    ImpactReport {
        kpis,
        windows,
        peaks,
        curve: acc.finish(),
        skipped,
    }
}

#[cfg(not(feature = "parallel"))]
fn compute_windows<E: Timestamped + Sync>(
    events: &[E],
    prices: &PriceSeries,
    spread_seconds: i64,
) -> Vec<Result<Option<EventWindow>>> {
    events
        .iter()
        .map(|e| window_for(e, prices, spread_seconds))
        .collect()
}

// Indexed collect keeps input order, so aggregation downstream is unaffected
// by scheduling.
#[cfg(feature = "parallel")]
fn compute_windows<E: Timestamped + Sync>(
    events: &[E],
    prices: &PriceSeries,
    spread_seconds: i64,
) -> Vec<Result<Option<EventWindow>>> {
    use rayon::prelude::*;

    events
        .par_iter()
        .map(|e| window_for(e, prices, spread_seconds))
        .collect()
}

/// User selection coming from the date pickers, the text box, and the topic toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardQuery {
    /// Start of the selection (inclusive); any format [`AnalysisConfig::parse_timestamp`] accepts.
    pub date_from: Option<String>,
    /// End of the selection (inclusive).
    pub date_to: Option<String>,
    /// Case-insensitive substring filter on post text.
    pub keyword: Option<String>,
    /// Keep only posts whose text or quoted text mentions one of
    /// [`AnalysisConfig::keywords`].
    pub topic_only: bool,
    /// Keep only posts strictly before [`AnalysisConfig::milestone_date`];
    /// no effect when none is configured.
    pub before_milestone: bool,
}

/// Result of [`run_query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// At least one date is missing; show the "pick both dates" placeholder.
    MissingDates,
    /// Analysis of the selection (possibly empty).
    Report(ImpactReport),
}

/// Filter `dataset` by `query` and analyze the selection.
///
/// Posts go through the date range, then the optional topic and milestone
/// cuts, then the free-text keyword.
///
/// Errors:
/// - [`ImpactError::InvalidTimestampFormat`](crate::ImpactError::InvalidTimestampFormat)
///   (or a time-zone error) when a date cannot be parsed
pub fn run_query<P: PostText + Clone + Sync>(
    dataset: &Dataset<P>,
    query: &DashboardQuery,
    cfg: &AnalysisConfig,
) -> Result<QueryOutcome> {
    let (Some(from), Some(to)) = (
        non_blank(query.date_from.as_deref()),
        non_blank(query.date_to.as_deref()),
    ) else {
        debug!("date input missing, returning placeholder");
        return Ok(QueryOutcome::MissingDates);
    };

    let (min, max) = cfg.date_bounds()?;
    let cutoff = if query.before_milestone {
        cfg.milestone()?
    } else {
        None
    };
    let mut from = cfg.parse_timestamp(from)?;
    let mut to = cfg.parse_timestamp(to)?;
    if let Some(min) = min {
        from = from.max(min);
    }
    if let Some(max) = max {
        to = to.min(max);
    }

    let keyword = query.keyword.as_deref().unwrap_or_default();
    debug!(
        from,
        to,
        keyword,
        topic_only = query.topic_only,
        cutoff,
        "applying dashboard filters"
    );

    if from > to {
        let none: [EventPoint<P>; 0] = [];
        return Ok(QueryOutcome::Report(analyze(&PriceSeries::default(), &none, cfg)));
    }

    let prices = prices_within(&dataset.prices, from, to)?;
    let mut events = within_range(&dataset.events, from, to)?;
    if query.topic_only {
        events = matching_any_keyword_with_quote(&events, &cfg.keywords);
    }
    if let Some(cutoff) = cutoff {
        events = before(&events, cutoff);
    }
    let events = matching_keyword(&events, keyword);

    Ok(QueryOutcome::Report(analyze(&prices, &events, cfg)))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
