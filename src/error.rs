//! Error types for the trendcast library.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for normalization and forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while normalizing input or fitting a forecast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// A raw row is missing a required field or holds an unusable value.
    #[error("malformed input{}: field '{field}' {reason}", .row.map(|r| format!(" at row {r}")).unwrap_or_default())]
    MalformedInput {
        row: Option<usize>,
        field: String,
        reason: String,
    },

    /// Too few usable observations for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The model fit did not converge.
    #[error("fit did not converge after {iterations} iterations: {reason}")]
    NonConvergence { iterations: usize, reason: String },

    /// The fit exceeded its wall-clock budget.
    #[error("fit exceeded time budget of {budget:?}")]
    Timeout { budget: Duration },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The upstream interest source failed.
    #[error("source error: {0}")]
    Source(String),

    /// Encoding or decoding JSON failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ForecastError {
    pub(crate) fn malformed(
        row: Option<usize>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedInput {
            row,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(err.to_string(), "insufficient data: need at least 2, got 1");

        let err = ForecastError::malformed(Some(3), "YouTube", "is not numeric");
        assert_eq!(
            err.to_string(),
            "malformed input at row 3: field 'YouTube' is not numeric"
        );

        let err = ForecastError::malformed(None, "date", "is missing");
        assert_eq!(err.to_string(), "malformed input: field 'date' is missing");

        let err = ForecastError::NonConvergence {
            iterations: 500,
            reason: "parameter change 1e-3 above tolerance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "fit did not converge after 500 iterations: parameter change 1e-3 above tolerance"
        );

        let err = ForecastError::Timeout {
            budget: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "fit exceeded time budget of 250ms");
    }

    #[test]
    fn json_errors_convert_to_serialization() {
        let err: ForecastError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ForecastError::Serialization(_)));
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::Source("keyword not found".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
