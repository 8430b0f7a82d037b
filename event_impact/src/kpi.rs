//! Scalar dashboard indicators and their display strings.

use std::fmt::Display;

use serde::Serialize;

use crate::models::PricePoint;

/// Placeholder shown when there is no data to summarize.
pub const NOT_AVAILABLE: &str = "N/A";

/// Headline numbers for one filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSummary {
    /// Posts left after filtering.
    pub total_events: usize,
    /// Mean opening price over the selection; `None` when no candles remain.
    pub average_price: Option<f64>,
    /// Mean price at post minutes (`0.0` sentinel when nothing matched).
    pub average_price_at_events: f64,
}

/// Rendered form of [`KpiSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiText {
    /// e.g. `"1,234"`.
    pub total_events: String,
    /// Comma-grouped with 4 decimals (`"12,345.6789"`), or `"N/A"`.
    pub average_price: String,
    /// 4 decimals, no grouping.
    pub average_price_at_events: String,
}

impl KpiSummary {
    /// Format every indicator for display.
    pub fn to_text(&self) -> KpiText {
        KpiText {
            total_events: format_count(self.total_events),
            average_price: format_price(self.average_price),
            average_price_at_events: format!("{:.4}", self.average_price_at_events),
        }
    }
}

/// Arithmetic mean of opening prices; `None` for an empty slice.
pub fn average_price(prices: &[PricePoint]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().map(|p| p.price).sum::<f64>() / prices.len() as f64)
}

/// Comma-grouped integer, e.g. `12345` -> `"12,345"`.
pub fn format_count(n: usize) -> String {
    group_integer_part(&n.to_string(), ',')
}

/// Comma-grouped price with four decimals, or [`NOT_AVAILABLE`].
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.is_finite() => group_integer_part(&format!("{p:.4}"), ','),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Space-grouped number, e.g. `1000000` -> `"1 000 000"`, `1234.5` -> `"1 234.5"`.
pub fn format_number<N: Display>(n: N) -> String {
    group_integer_part(&n.to_string(), ' ')
}

fn group_integer_part(s: &str, sep: char) -> String {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", s),
    };
    let (int, frac) = match rest.find('.') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    if !int.bytes().all(|b| b.is_ascii_digit()) {
        // inf / NaN
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + int.len() / 3);
    out.push_str(sign);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out.push_str(frac);
    out
}
