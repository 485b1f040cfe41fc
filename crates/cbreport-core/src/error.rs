//! Error types for the cbreport core library
//!
//! Every failure aborts the report: nothing is retried and no partial report
//! is produced. Messages name the offending path and, for row failures, the
//! identity of the row being folded.

use thiserror::Error;

/// Main error type for report generation
#[derive(Error, Debug)]
pub enum Error {
    /// A required row, metadata or summary key is absent
    #[error("Missing field '{path}' in {context}")]
    MissingField { path: String, context: String },

    /// A key is present but holds the wrong kind of JSON value
    #[error("Invalid value at '{path}' in {context}: expected {expected}")]
    InvalidValue {
        path: String,
        expected: String,
        context: String,
    },

    /// A derived statistic would divide by zero
    #[error("Division by zero computing {quantity}")]
    DivideByZero { quantity: String },

    /// The reporter was configured inconsistently
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// JSON serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn missing(path: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            path: path.into(),
            context: context.into(),
        }
    }

    pub(crate) fn invalid(
        path: impl Into<String>,
        expected: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            path: path.into(),
            expected: expected.into(),
            context: context.into(),
        }
    }

    pub(crate) fn divide_by_zero(quantity: impl Into<String>) -> Self {
        Self::DivideByZero {
            quantity: quantity.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            message: source.to_string(),
            source,
        }
    }
}
