//! Series normalization — provider-native rows to a canonical price series.
//!
//! Providers disagree on column names (`date` vs `trade_date`), date formats
//! (`2024-03-08` vs `20240308`), and cell types (numbers vs numeric strings).
//! All of that is resolved here, in one pure transform, so the classifier
//! only ever sees a clean ascending `(date, close)` sequence.

use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::{PricePoint, SeriesError};

use super::provider::RawSeries;

/// Column names accepted as the trading date, in priority order.
const DATE_COLUMNS: [&str; 2] = ["date", "trade_date"];

/// Normalize a raw fetched series into an ascending `(date, close)` sequence.
///
/// Rows with a null or missing date or close are dropped. An input that is
/// empty after cleaning is an `EmptySeries`; a close that is present but not
/// numeric is an `InvalidPrice`; two rows sharing a date is a
/// `DuplicateDate`. Positivity of closes is not checked here — that is the
/// classifier's domain validation.
pub fn normalize_series(raw: &RawSeries) -> Result<Vec<PricePoint>, SeriesError> {
    let date_idx = DATE_COLUMNS
        .iter()
        .find_map(|c| raw.columns.iter().position(|col| col == c));
    let close_idx = raw.columns.iter().position(|col| col == "close");

    let (date_idx, close_idx) = match (date_idx, close_idx) {
        (Some(d), Some(c)) => (d, c),
        // Without the two required columns nothing survives cleaning.
        _ => {
            return Err(SeriesError::EmptySeries {
                symbol: raw.symbol.clone(),
            })
        }
    };

    let mut points = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let date_cell = row.get(date_idx).unwrap_or(&Value::Null);
        let close_cell = row.get(close_idx).unwrap_or(&Value::Null);

        if date_cell.is_null() || close_cell.is_null() {
            continue;
        }

        let Some(date) = parse_date(date_cell) else {
            continue;
        };

        let close = parse_close(close_cell).ok_or_else(|| SeriesError::InvalidPrice {
            symbol: raw.symbol.clone(),
            date,
            detail: format!("non-numeric close {close_cell}"),
        })?;

        points.push(PricePoint::new(date, close));
    }

    if points.is_empty() {
        return Err(SeriesError::EmptySeries {
            symbol: raw.symbol.clone(),
        });
    }

    points.sort_by_key(|p| p.date);

    if let Some(dup) = crate::domain::point::first_ordering_violation(&points) {
        return Err(SeriesError::DuplicateDate {
            symbol: raw.symbol.clone(),
            date: dup,
        });
    }

    Ok(points)
}

fn parse_date(cell: &Value) -> Option<NaiveDate> {
    let s = cell.as_str()?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
}

fn parse_close(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
