//! Turn raw interest rows into an ordered, validated `Series`.

use super::table::{RawTable, Record};
use crate::core::{Observation, Series};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Default name of the partial-period flag emitted by search-interest sources.
pub const DEFAULT_PARTIAL_FIELD: &str = "isPartial";

/// How to resolve several rows that share a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Average the values.
    #[default]
    Average,
    /// Keep the value of the last row in input order.
    LastWins,
}

/// Options controlling normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Column marking incomplete rows; `None` disables the filter.
    pub partial_field: Option<String>,
    pub duplicates: DuplicatePolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            partial_field: Some(DEFAULT_PARTIAL_FIELD.to_string()),
            duplicates: DuplicatePolicy::Average,
        }
    }
}

impl NormalizeOptions {
    pub fn with_partial_field(mut self, field: impl Into<String>) -> Self {
        self.partial_field = Some(field.into());
        self
    }

    pub fn without_partial_field(mut self) -> Self {
        self.partial_field = None;
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }
}

/// Normalize `raw` with default options.
///
/// Rows flagged partial are dropped, the timestamp and value fields are
/// coerced into observations, and the result is sorted by date.
///
/// # Example
/// ```
/// use trendcast::ingest::{normalize, RawTable};
///
/// let raw = RawTable::from_json_records(r#"[
///     {"date": "2024-01-02", "YouTube": 71, "isPartial": false},
///     {"date": "2024-01-01", "YouTube": 70, "isPartial": false},
///     {"date": "2024-01-03", "YouTube": 12, "isPartial": true}
/// ]"#).unwrap();
///
/// let series = normalize(&raw, "date", "YouTube").unwrap();
/// assert_eq!(series.values(), vec![70.0, 71.0]);
/// ```
pub fn normalize(raw: &RawTable, timestamp_field: &str, value_field: &str) -> Result<Series> {
    normalize_with(
        raw,
        timestamp_field,
        value_field,
        &NormalizeOptions::default(),
    )
}

/// Normalize `raw` with explicit options.
pub fn normalize_with(
    raw: &RawTable,
    timestamp_field: &str,
    value_field: &str,
    options: &NormalizeOptions,
) -> Result<Series> {
    // BTreeMap keyed by date gives ascending order; entries hold (sum, count, last).
    let mut by_date: BTreeMap<NaiveDate, (f64, usize, f64)> = BTreeMap::new();
    let mut dropped = 0usize;

    for (row_idx, row) in raw.rows().iter().enumerate() {
        if let Some(flag) = options.partial_field.as_deref() {
            if is_partial(row, flag) {
                dropped += 1;
                continue;
            }
        }

        let date = coerce_date(row, row_idx, timestamp_field)?;
        let value = coerce_value(row, row_idx, value_field)?;

        let entry = by_date.entry(date).or_insert((0.0, 0, value));
        entry.0 += value;
        entry.1 += 1;
        entry.2 = value;
    }

    if dropped > 0 {
        debug!(dropped, "dropped partial rows");
    }

    let duplicates = by_date.values().filter(|(_, count, _)| *count > 1).count();
    if duplicates > 0 {
        warn!(
            duplicates,
            policy = ?options.duplicates,
            "resolved duplicate dates"
        );
    }

    let observations = by_date
        .into_iter()
        .map(|(date, (sum, count, last))| {
            let value = match options.duplicates {
                DuplicatePolicy::Average => sum / count as f64,
                DuplicatePolicy::LastWins => last,
            };
            Observation::new(date, value)
        })
        .collect();

    Ok(Series::new(observations)?.with_label(value_field))
}

fn is_partial(row: &Record, field: &str) -> bool {
    match row.get(field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

fn coerce_date(row: &Record, row_idx: usize, field: &str) -> Result<NaiveDate> {
    match row.get(field) {
        None => Err(ForecastError::malformed(Some(row_idx), field, "is missing")),
        Some(Value::String(s)) => parse_date(s).ok_or_else(|| {
            ForecastError::malformed(Some(row_idx), field, format!("has unparseable date '{s}'"))
        }),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| {
                ForecastError::malformed(Some(row_idx), field, format!("has invalid epoch {n}"))
            }),
        Some(other) => Err(ForecastError::malformed(
            Some(row_idx),
            field,
            format!("is not a date: {other}"),
        )),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn coerce_value(row: &Record, row_idx: usize, field: &str) -> Result<f64> {
    let value = match row.get(field) {
        None => return Err(ForecastError::malformed(Some(row_idx), field, "is missing")),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) if v.is_finite() => Err(ForecastError::malformed(
            Some(row_idx),
            field,
            format!("is negative ({v})"),
        )),
        _ => Err(ForecastError::malformed(
            Some(row_idx),
            field,
            format!("is not numeric: {}", row[field]),
        )),
    }
}
