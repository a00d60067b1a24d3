//! PricePoint — the fundamental input unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closing price for a single instrument on a single trading day.
///
/// Points are immutable once fetched. A series is valid input for the
/// classifier only if it is ascending by date with no duplicate dates and
/// every close is positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Check a series for the ordering invariants the classifier assumes.
///
/// Returns the first offending date on a duplicate or out-of-order pair.
pub fn first_ordering_violation(points: &[PricePoint]) -> Option<NaiveDate> {
    points
        .windows(2)
        .find(|w| w[1].date <= w[0].date)
        .map(|w| w[1].date)
}
