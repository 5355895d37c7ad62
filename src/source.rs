//! Where raw interest tables come from, and the fetch-normalize-forecast
//! pipeline on top of them.

use crate::core::{ForecastResult, PeriodUnit};
use crate::engine::ForecastEngine;
use crate::error::{ForecastError, Result};
use crate::ingest::{normalize, RawTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

pub const DEFAULT_KEYWORD: &str = "YouTube";
pub const DEFAULT_TIMEFRAME: &str = "today 5-y";
pub const DEFAULT_GEO: &str = "IN";
/// Timestamp column produced by interest sources.
pub const DATE_FIELD: &str = "date";

/// What to fetch: a keyword's interest over a timeframe in a region.
///
/// Fields are validated on construction and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QueryFields")]
pub struct InterestQuery {
    keyword: String,
    timeframe: String,
    geo: String,
    value_field: String,
}

#[derive(Deserialize)]
struct QueryFields {
    keyword: String,
    #[serde(default = "default_timeframe")]
    timeframe: String,
    #[serde(default = "default_geo")]
    geo: String,
    #[serde(default)]
    value_field: Option<String>,
}

fn default_timeframe() -> String {
    DEFAULT_TIMEFRAME.to_string()
}

fn default_geo() -> String {
    DEFAULT_GEO.to_string()
}

impl TryFrom<QueryFields> for InterestQuery {
    type Error = ForecastError;

    fn try_from(fields: QueryFields) -> Result<Self> {
        let query = InterestQuery::new(fields.keyword, fields.timeframe, fields.geo)?;
        match fields.value_field {
            Some(field) => query.with_value_field(field),
            None => Ok(query),
        }
    }
}

impl InterestQuery {
    /// Build a query whose value column is named after the keyword.
    pub fn new(
        keyword: impl Into<String>,
        timeframe: impl Into<String>,
        geo: impl Into<String>,
    ) -> Result<Self> {
        let keyword = non_blank("keyword", keyword.into())?;
        let timeframe = non_blank("timeframe", timeframe.into())?;
        let geo = non_blank("geo", geo.into())?;
        Ok(Self {
            value_field: keyword.clone(),
            keyword,
            timeframe,
            geo,
        })
    }

    /// Read values from `field` instead of the keyword-named column.
    pub fn with_value_field(self, field: impl Into<String>) -> Result<Self> {
        Ok(Self {
            value_field: non_blank("value_field", field.into())?,
            ..self
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    pub fn geo(&self) -> &str {
        &self.geo
    }

    pub fn value_field(&self) -> &str {
        &self.value_field
    }
}

impl Default for InterestQuery {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_KEYWORD.to_string(),
            timeframe: DEFAULT_TIMEFRAME.to_string(),
            geo: DEFAULT_GEO.to_string(),
            value_field: DEFAULT_KEYWORD.to_string(),
        }
    }
}

fn non_blank(name: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ForecastError::InvalidParameter(format!(
            "{name} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// A provider of raw interest tables.
///
/// Implementations report failures as [`ForecastError::Source`] rather than
/// returning an empty table.
pub trait InterestSource {
    fn fetch(&self, query: &InterestQuery) -> Result<RawTable>;
}

/// Serves pre-recorded tables keyed by keyword.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tables: HashMap<String, RawTable>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, keyword: impl Into<String>, table: RawTable) -> Self {
        self.insert(keyword, table);
        self
    }

    pub fn insert(&mut self, keyword: impl Into<String>, table: RawTable) {
        self.tables.insert(keyword.into(), table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl InterestSource for StaticSource {
    fn fetch(&self, query: &InterestQuery) -> Result<RawTable> {
        self.tables.get(query.keyword()).cloned().ok_or_else(|| {
            ForecastError::Source(format!(
                "no recorded data for keyword '{}' ({}, {})",
                query.keyword(),
                query.timeframe(),
                query.geo()
            ))
        })
    }
}

/// Fetch the table for `query`, normalize it, and forecast the engine's
/// configured horizon in days.
pub fn forecast_interest<S: InterestSource + ?Sized>(
    source: &S,
    query: &InterestQuery,
    engine: &ForecastEngine,
) -> Result<ForecastResult> {
    let raw = source.fetch(query)?;
    debug!(
        keyword = query.keyword(),
        rows = raw.len(),
        "fetched interest table"
    );

    let series = normalize(&raw, DATE_FIELD, query.value_field())?;
    let horizon = engine.config().horizon;
    let forecast = engine.forecast(&series, horizon, PeriodUnit::Day)?;

    info!(
        keyword = query.keyword(),
        geo = query.geo(),
        observations = series.len(),
        horizon,
        "interest forecast ready"
    );
    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(n: usize) -> RawTable {
        let rows = (0..n)
            .map(|i| {
                let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                let record = json!({
                    "date": date.format("%Y-%m-%d").to_string(),
                    "YouTube": 50 + (i % 7) as i64,
                    "isPartial": i + 1 == n,
                });
                record.as_object().unwrap().clone()
            })
            .collect();
        RawTable::from_records(rows)
    }

    #[test]
    fn default_query_matches_documented_defaults() {
        let query = InterestQuery::default();
        assert_eq!(query.keyword(), "YouTube");
        assert_eq!(query.timeframe(), "today 5-y");
        assert_eq!(query.geo(), "IN");
        assert_eq!(query.value_field(), "YouTube");
    }

    #[test]
    fn query_rejects_blank_fields() {
        assert!(InterestQuery::new(" ", "today 5-y", "IN").is_err());
        assert!(InterestQuery::new("rust", "", "IN").is_err());
        assert!(InterestQuery::default().with_value_field("").is_err());
    }

    #[test]
    fn query_deserializes_with_defaults_and_validation() {
        let query: InterestQuery = serde_json::from_str(r#"{"keyword": "rust"}"#).unwrap();
        assert_eq!(query, InterestQuery::new("rust", "today 5-y", "IN").unwrap());

        let query: InterestQuery =
            serde_json::from_str(r#"{"keyword": "rust", "value_field": "score"}"#).unwrap();
        assert_eq!(query.value_field(), "score");

        assert!(serde_json::from_str::<InterestQuery>(r#"{"keyword": ""}"#).is_err());
    }

    #[test]
    fn static_source_reports_missing_keyword() {
        let source = StaticSource::new().with_table("YouTube", table(3));
        let query = InterestQuery::new("Netflix", "today 5-y", "IN").unwrap();
        assert!(matches!(
            source.fetch(&query),
            Err(ForecastError::Source(_))
        ));
        assert_eq!(source.fetch(&InterestQuery::default()).unwrap().len(), 3);
    }

    #[test]
    fn pipeline_drops_partial_row_and_forecasts_horizon() {
        let source = StaticSource::new().with_table("YouTube", table(31));
        let engine = ForecastEngine::default();
        let forecast = forecast_interest(&source, &InterestQuery::default(), &engine).unwrap();

        assert_eq!(forecast.history().len(), 30);
        assert_eq!(forecast.horizon(), 30);
    }

    #[test]
    fn pipeline_surfaces_insufficient_data() {
        let source = StaticSource::new().with_table("YouTube", table(2));
        let engine = ForecastEngine::default();
        let err = forecast_interest(&source, &InterestQuery::default(), &engine).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { needed: 2, got: 1 });
    }
}
