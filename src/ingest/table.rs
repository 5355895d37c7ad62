//! Raw tabular input keyed by arbitrary field names.

use crate::core::Series;
use crate::error::{ForecastError, Result};
use serde_json::{Map, Value};

/// A single raw record.
pub type Record = Map<String, Value>;

/// Rows of loosely-typed records as delivered by an interest source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Record>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    /// Parse record-oriented JSON: `[{"date": ..., "YouTube": 42, ...}, ...]`.
    pub fn from_json_records(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Array(items) = value else {
            return Err(ForecastError::Serialization(
                "expected a JSON array of records".to_string(),
            ));
        };

        let rows = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(ForecastError::malformed(
                    Some(i),
                    "<row>",
                    format!("is not a record: {other}"),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }

    pub fn push_row(&mut self, row: Record) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row carries `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.rows.iter().any(|r| r.contains_key(field))
    }
}

impl FromIterator<Record> for RawTable {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Series {
    /// Render the series as a raw table with ISO dates.
    pub fn to_table(&self, timestamp_field: &str, value_field: &str) -> RawTable {
        self.iter()
            .map(|obs| {
                let mut record = Record::new();
                record.insert(
                    timestamp_field.to_string(),
                    Value::String(obs.date.format("%Y-%m-%d").to_string()),
                );
                record.insert(value_field.to_string(), Value::from(obs.value));
                record
            })
            .collect()
    }
}
