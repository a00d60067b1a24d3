//! Persisted per-day metric shapes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trend direction for an instrument on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStatus {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

/// Tiered signal tag derived from deviation, status, and streak length.
///
/// The tag is driven by the *sign of the deviation*, not by `status` alone,
/// so a hysteresis-carried status can never disagree with the tag family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalTag {
    /// Fresh breakout: positive deviation, status YES, streak of three days or less.
    Breakout,
    /// Healthy uptrend: positive deviation within 15% of the average.
    Strong,
    /// Stretched uptrend: deviation above +15%.
    Overheat,
    /// Weakness: deviation at or below zero, within 15% of the average.
    Slump,
    /// Capitulation: deviation below -15%.
    ExtremeBear,
}

/// One point of the bounded sparkline window.
///
/// `price` and `ma20` are rounded to 4 decimal places at construction. The
/// rounding is a precision floor: rounding later (or coarser) can flip the
/// deviation sign on low-priced instruments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SparklinePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub ma20: f64,
}

impl SparklinePoint {
    pub fn new(date: NaiveDate, price: f64, ma20: f64) -> Self {
        Self {
            date,
            price: round4(price),
            ma20: round4(ma20),
        }
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Classifier output for one (symbol, date): everything except the rank and
/// the sparkline window, which are produced by later pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub close_price: f64,
    pub ma20_price: f64,
    pub status: TrendStatus,
    /// Signed fractional distance of close from MA20.
    pub deviation_pct: f64,
    /// Consecutive days in the current status, starting at 1.
    pub duration_days: u32,
    pub signal_tag: SignalTag,
    /// 1-day simple return; absent on the first day of the series.
    pub change_pct: Option<f64>,
    /// Cumulative return since the day before the current streak began;
    /// absent when that day predates available history.
    pub trend_pct: Option<f64>,
}

/// The unit of persistence: one row per (symbol, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(flatten)]
    pub metric: DailyMetric,
    /// Dense rank by |deviation| among instruments sharing this date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_rank: Option<u32>,
    /// Bounded rolling window for compact trend display, most-recent-last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sparkline: Vec<SparklinePoint>,
}

impl DailyRecord {
    pub fn from_metric(metric: DailyMetric) -> Self {
        Self {
            metric,
            trend_rank: None,
            sparkline: Vec::new(),
        }
    }
}
