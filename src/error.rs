//! Tabserve - Error types
//!
//! Two families: [`LoadError`] is fatal and only ever seen at startup,
//! [`QueryError`] is per-request and always maps onto an HTTP status.

use axum::http::StatusCode;
use thiserror::Error;

/// Why a range bound pair was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    /// A bound is non-numeric, signed, fractional or zero.
    #[error("'start' and 'end' parameters must be positive integers.")]
    NotPositiveInteger,

    /// Both bounds are valid on their own but `start > end`.
    #[error("'start' cannot be larger than 'end'.")]
    StartAfterEnd,
}

/// Errors surfaced to a client for a single request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The `size` parameter is outside the fixed enumeration.
    #[error("'size' parameter takes only values 'small', 'medium', 'large' or 'complete'.")]
    InvalidSpecifier(String),

    /// A required range bound is absent or empty.
    #[error("Both a 'start' and 'end' parameters are required.")]
    MissingParameter,

    /// A range bound is malformed, or the bounds are out of order.
    #[error("{0}")]
    InvalidRange(#[from] RangeViolation),

    /// The fault simulator tripped. Carries no detail on purpose.
    #[error("Internal server error")]
    SimulatedFailure,
}

impl QueryError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::SimulatedFailure => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Errors raised while loading the dataset at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error.
    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Parquet error.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow error.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Rows do not share one flat schema.
    #[error("Schema error: {0}")]
    Schema(String),
}
