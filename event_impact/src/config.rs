//! Analysis configuration: parsing, normalization, and loading.
//!
//! A small TOML document replaces the process-wide constants a dashboard would
//! otherwise hard-code:
//! - the window half-width around each post (`spread_hours`)
//! - the bucket rounding precision of the impact curve (`bucket_decimals`)
//! - the topic keyword set used to pre-select posts
//! - optional date clamps, a named milestone date, and the zone for naive inputs
//!
//! Every key is optional; missing keys take the dashboard defaults.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_config_str`]
//! - Parse + normalize from a file path: [`load_config_path`]
//! - Path taken from `EVENT_IMPACT_CONFIG`, defaults when unset: [`load_config_from_env`]

use std::collections::HashSet;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use shared_utils::env::get_optional_env_var;

use crate::{
    aggregate::DEFAULT_BUCKET_DECIMALS,
    errors::Result as ImpactResult,
    time_align::{DstPolicy, SECS_PER_HOUR, local_to_epoch_seconds, to_epoch_seconds},
};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "EVENT_IMPACT_CONFIG";

/// Tunables for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct AnalysisConfig {
    /// Half-width of each post window, in hours.
    pub spread_hours: u32,
    /// Decimal places kept in impact-curve bucket keys.
    pub bucket_decimals: u32,
    /// Topic keywords for the topic pre-selection of a query (post text or quoted text);
    /// normalized to trimmed, case-insensitively unique values.
    pub keywords: Vec<String>,
    /// Earliest selectable date (`YYYY-MM-DD`).
    pub min_date: Option<String>,
    /// Latest selectable date (`YYYY-MM-DD`).
    pub max_date: Option<String>,
    /// Cutoff date; a query can keep only posts strictly before it.
    pub milestone_date: Option<String>,
    /// IANA zone used for naive date inputs; UTC when absent.
    pub timezone: Option<String>,
    /// DST handling for naive inputs in `timezone`. When absent, repeated wall
    /// times take the earlier instant and skipped ones shift forward.
    pub dst_policy: Option<DstPolicy>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            spread_hours: 6,
            bucket_decimals: DEFAULT_BUCKET_DECIMALS,
            keywords: vec!["dogecoin".into(), "Ðoge".into(), "crypto".into()],
            min_date: None,
            max_date: None,
            milestone_date: None,
            timezone: None,
            dst_policy: None,
        }
    }
}

impl AnalysisConfig {
    /// Window half-width in seconds.
    pub fn spread_seconds(&self) -> i64 {
        i64::from(self.spread_hours) * SECS_PER_HOUR
    }

    /// Parse a user-supplied date/time, honouring [`timezone`](Self::timezone) for naive input.
    pub fn parse_timestamp(&self, s: &str) -> ImpactResult<i64> {
        match (self.timezone.as_deref(), self.dst_policy) {
            (Some(tz), Some(policy)) => local_to_epoch_seconds(s, tz, policy),
            (Some(tz), None) => local_to_epoch_seconds(s, tz, DstPolicy::PreferEarliest)
                .or_else(|_| local_to_epoch_seconds(s, tz, DstPolicy::ShiftForward)),
            (None, _) => to_epoch_seconds(s),
        }
    }

    /// [`milestone_date`](Self::milestone_date) as epoch seconds.
    pub fn milestone(&self) -> ImpactResult<Option<i64>> {
        self.milestone_date
            .as_deref()
            .map(|d| self.parse_timestamp(d))
            .transpose()
    }

    /// `min_date`/`max_date` as epoch seconds.
    pub fn date_bounds(&self) -> ImpactResult<(Option<i64>, Option<i64>)> {
        let min = self.min_date.as_deref().map(|d| self.parse_timestamp(d)).transpose()?;
        let max = self.max_date.as_deref().map(|d| self.parse_timestamp(d)).transpose()?;
        Ok((min, max))
    }
}

/// Summary of changes performed during normalization.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Keywords whose surrounding whitespace was removed.
    pub keywords_trimmed: usize,
    /// Blank keywords dropped.
    pub empty_keywords_dropped: usize,
    /// Case-insensitive duplicates dropped (first occurrence kept).
    pub keywords_deduped: usize,
}

/// Normalize and validate a configuration in place.
///
/// What normalization does:
/// - Trim keywords, drop blank ones, de-duplicate case-insensitively preserving order
/// - Trim date and time zone strings, turning blank ones into `None`
///
/// Errors:
/// - `spread_hours == 0` or `bucket_decimals > 9`
/// - Unknown time zone, unparseable dates, or `min_date > max_date`
pub fn normalize_config(cfg: &mut AnalysisConfig) -> anyhow::Result<NormalizationReport> {
    let mut report = NormalizationReport::default();

    if cfg.spread_hours == 0 {
        bail!("spread_hours must be > 0");
    }
    if cfg.bucket_decimals > 9 {
        bail!("bucket_decimals must be <= 9, got {}", cfg.bucket_decimals);
    }

    let mut seen = HashSet::new();
    let mut keywords = Vec::with_capacity(cfg.keywords.len());
    for raw in std::mem::take(&mut cfg.keywords) {
        let kw = raw.trim();
        if kw.len() != raw.len() {
            report.keywords_trimmed += 1;
        }
        if kw.is_empty() {
            report.empty_keywords_dropped += 1;
            continue;
        }
        if seen.insert(kw.to_lowercase()) {
            keywords.push(kw.to_string());
        } else {
            report.keywords_deduped += 1;
        }
    }
    cfg.keywords = keywords;

    for field in [
        &mut cfg.min_date,
        &mut cfg.max_date,
        &mut cfg.milestone_date,
        &mut cfg.timezone,
    ] {
        *field = field
            .take()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    if let Some(tz) = cfg.timezone.as_deref() {
        tz.parse::<chrono_tz::Tz>()
            .map_err(|_| anyhow::anyhow!("unknown timezone: {tz}"))?;
    }
    let (min, max) = cfg.date_bounds().context("invalid date bound")?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            bail!("min_date must not be after max_date");
        }
    }
    cfg.milestone().context("invalid milestone_date")?;

    Ok(report)
}

/// Parse and normalize a configuration from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<AnalysisConfig> {
    let mut cfg: AnalysisConfig = toml::from_str(toml_str).context("failed to parse config TOML")?;
    let report = normalize_config(&mut cfg).context("normalize_config failed")?;
    tracing::debug!(?report, "loaded analysis config");
    Ok(cfg)
}

/// Read a configuration TOML file from disk, parse, and normalize it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<AnalysisConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}

/// Load from the file named by `var`, or fall back to defaults when it is unset.
pub fn load_config_from_env_var(var: &str) -> anyhow::Result<AnalysisConfig> {
    match get_optional_env_var(var)? {
        Some(path) => load_config_path(path),
        None => Ok(AnalysisConfig::default()),
    }
}

/// [`load_config_from_env_var`] with [`CONFIG_PATH_ENV`].
pub fn load_config_from_env() -> anyhow::Result<AnalysisConfig> {
    load_config_from_env_var(CONFIG_PATH_ENV)
}
