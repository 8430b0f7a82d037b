//! Date-range and keyword selection over prices and posts.
//!
//! Keyword matching is case-insensitive plain substring search, so characters
//! such as `|` or `.` match themselves. Posts without text never match a
//! non-blank keyword.

use std::{collections::HashMap, hash::Hash};

use crate::{
    errors::{ImpactError, Result},
    models::{EventPoint, PostText, PriceSeries, Timestamped},
    window::slice_between,
};

/// Items with `from <= epoch_seconds <= to`, in input order.
pub fn within_range<T: Timestamped + Clone>(items: &[T], from: i64, to: i64) -> Result<Vec<T>> {
    check_range(from, to)?;
    Ok(items
        .iter()
        .filter(|i| (from..=to).contains(&i.epoch_seconds()))
        .cloned()
        .collect())
}

/// Items with `epoch_seconds < cutoff`, in input order.
pub fn before<T: Timestamped + Clone>(items: &[T], cutoff: i64) -> Vec<T> {
    items
        .iter()
        .filter(|i| i.epoch_seconds() < cutoff)
        .cloned()
        .collect()
}

/// Price-series variant of [`within_range`]; binary-searches the sorted series.
pub fn prices_within(series: &PriceSeries, from: i64, to: i64) -> Result<PriceSeries> {
    check_range(from, to)?;
    Ok(slice_between(series, from, to).to_vec().into())
}

/// Posts whose primary text contains `keyword`; a blank keyword keeps everything.
pub fn matching_keyword<P: PostText + Clone>(
    events: &[EventPoint<P>],
    keyword: &str,
) -> Vec<EventPoint<P>> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| contains_ci(e.payload.primary_text(), &needle))
        .cloned()
        .collect()
}

/// Posts whose primary text contains any of `keywords`; no non-blank keyword keeps everything.
pub fn matching_any_keyword<P: PostText + Clone, S: AsRef<str>>(
    events: &[EventPoint<P>],
    keywords: &[S],
) -> Vec<EventPoint<P>> {
    let needles = needles(keywords);
    if needles.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| any_in(e.payload.primary_text(), &needles))
        .cloned()
        .collect()
}

/// Like [`matching_any_keyword`], but a hit in the quoted post's text also counts.
pub fn matching_any_keyword_with_quote<P: PostText + Clone, S: AsRef<str>>(
    events: &[EventPoint<P>],
    keywords: &[S],
) -> Vec<EventPoint<P>> {
    let needles = needles(keywords);
    if needles.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| {
            any_in(e.payload.primary_text(), &needles) || any_in(e.payload.quoted_text(), &needles)
        })
        .cloned()
        .collect()
}

/// Every item whose key is shared with at least one other item, in input order.
pub fn find_duplicates<T, K, F>(items: &[T], key: F) -> Vec<&T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut counts: HashMap<K, usize> = HashMap::with_capacity(items.len());
    for i in items {
        *counts.entry(key(i)).or_default() += 1;
    }
    items.iter().filter(|i| counts[&key(i)] > 1).collect()
}

fn check_range(from: i64, to: i64) -> Result<()> {
    if from > to {
        return Err(ImpactError::InvertedRange { from, to });
    }
    Ok(())
}

fn needles<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn contains_ci(text: Option<&str>, needle: &str) -> bool {
    text.is_some_and(|t| t.to_lowercase().contains(needle))
}

fn any_in(text: Option<&str>, needles: &[String]) -> bool {
    match text {
        Some(t) => {
            let hay = t.to_lowercase();
            needles.iter().any(|n| hay.contains(n.as_str()))
        }
        None => false,
    }
}
