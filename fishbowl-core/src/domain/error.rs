//! Structured error types for series validation and classification.

use chrono::NaiveDate;
use thiserror::Error;

/// Per-instrument data failures.
///
/// Any of these fails the instrument for the current run; none of them is
/// fatal to a batch. Corrupt *persisted* state (a sparkline blob that no
/// longer parses) is deliberately not represented here — that condition is
/// self-healed, not propagated.
#[derive(Debug, Clone, Error)]
pub enum SeriesError {
    #[error("no usable rows for '{symbol}' after cleaning")]
    EmptySeries { symbol: String },

    #[error("invalid close for '{symbol}' on {date}: {detail}")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        detail: String,
    },

    #[error("duplicate or out-of-order date for '{symbol}': {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },
}

impl SeriesError {
    /// Short machine-readable kind for run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            SeriesError::EmptySeries { .. } => "empty_series",
            SeriesError::InvalidPrice { .. } => "invalid_price",
            SeriesError::DuplicateDate { .. } => "duplicate_date",
        }
    }
}
