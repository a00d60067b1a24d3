//! The fishbowl trend classifier.
//!
//! Single left-to-right pass over a clean price series producing one
//! `DailyMetric` per point. The only state carried between iterations is the
//! rolling sum and a `TrendState` accumulator, so the status transition is a
//! pure `(Option<prev>, close, ma20) -> next` function that can be tested in
//! isolation.
//!
//! Status rules:
//! - First point: `YES` iff `close >= ma20` (no prior state, no bands).
//! - After that: `close > ma20 * 1.01` forces `YES`, `close < ma20 * 0.99`
//!   forces `NO`, anything inside the ±1% band keeps yesterday's status.
//!   The band is what stops the status from flip-flopping on noise near the
//!   average.

use crate::domain::{DailyMetric, PricePoint, SeriesError, SignalTag, TrendStatus};

use super::rolling::TrailingMean;

/// Rolling-average window in trading days.
pub const MA_WINDOW: usize = 20;

/// Half-width of the hysteresis band around MA20.
pub const BUFFER_PCT: f64 = 0.01;

/// |deviation| beyond which an uptrend is OVERHEAT / a downtrend EXTREME_BEAR.
pub const EXTREME_DEVIATION: f64 = 0.15;

/// Longest streak still tagged as a fresh BREAKOUT.
pub const BREAKOUT_MAX_DAYS: u32 = 3;

/// Carried accumulator of the status state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendState {
    pub status: TrendStatus,
    pub duration: u32,
}

impl TrendState {
    /// Transition function: previous state (if any) plus today's close and
    /// MA20 produce today's state.
    pub fn step(prev: Option<&TrendState>, close: f64, ma20: f64) -> TrendState {
        let Some(prev) = prev else {
            let status = if close >= ma20 {
                TrendStatus::Yes
            } else {
                TrendStatus::No
            };
            return TrendState {
                status,
                duration: 1,
            };
        };

        let status = if close > ma20 * (1.0 + BUFFER_PCT) {
            TrendStatus::Yes
        } else if close < ma20 * (1.0 - BUFFER_PCT) {
            TrendStatus::No
        } else {
            prev.status
        };

        let duration = if status == prev.status {
            prev.duration + 1
        } else {
            1
        };

        TrendState { status, duration }
    }
}

/// Derive the tiered signal tag.
///
/// The tag family follows the deviation sign, never the status alone: a
/// status carried through the buffer zone with the close already below the
/// average must not read as a bullish tag.
pub fn signal_tag(status: TrendStatus, duration: u32, deviation: f64) -> SignalTag {
    if deviation > 0.0 {
        if status == TrendStatus::Yes && duration <= BREAKOUT_MAX_DAYS {
            SignalTag::Breakout
        } else if deviation > EXTREME_DEVIATION {
            SignalTag::Overheat
        } else {
            SignalTag::Strong
        }
    } else if deviation < -EXTREME_DEVIATION {
        SignalTag::ExtremeBear
    } else {
        SignalTag::Slump
    }
}

/// Classify a full price series.
///
/// Input must be ascending by date with unique dates and positive closes;
/// violations fail the whole series before any metric is produced.
/// Output has one metric per input point, in the same order.
pub fn classify(symbol: &str, series: &[PricePoint]) -> Result<Vec<DailyMetric>, SeriesError> {
    if series.is_empty() {
        return Err(SeriesError::EmptySeries {
            symbol: symbol.to_string(),
        });
    }

    if let Some(date) = crate::domain::point::first_ordering_violation(series) {
        return Err(SeriesError::DuplicateDate {
            symbol: symbol.to_string(),
            date,
        });
    }

    // Prices are assumed positive; classification has no meaning otherwise.
    for point in series {
        if !(point.close > 0.0) || !point.close.is_finite() {
            return Err(SeriesError::InvalidPrice {
                symbol: symbol.to_string(),
                date: point.date,
                detail: format!("non-positive close {}", point.close),
            });
        }
    }

    let mut ma = TrailingMean::new(MA_WINDOW);
    let mut state: Option<TrendState> = None;
    let mut metrics = Vec::with_capacity(series.len());

    for (i, point) in series.iter().enumerate() {
        let ma20 = ma.push(point.close);

        if ma20 == 0.0 {
            return Err(SeriesError::InvalidPrice {
                symbol: symbol.to_string(),
                date: point.date,
                detail: "zero MA20".into(),
            });
        }

        let next = TrendState::step(state.as_ref(), point.close, ma20);
        let deviation = (point.close - ma20) / ma20;

        let change_pct = (i > 0).then(|| {
            let prev_close = series[i - 1].close;
            (point.close - prev_close) / prev_close
        });

        // The reference close is the day before the streak began.
        let trend_pct = i
            .checked_sub(next.duration as usize)
            .map(|start| {
                let start_close = series[start].close;
                (point.close - start_close) / start_close
            });

        metrics.push(DailyMetric {
            date: point.date,
            close_price: point.close,
            ma20_price: ma20,
            status: next.status,
            deviation_pct: deviation,
            duration_days: next.duration,
            signal_tag: signal_tag(next.status, next.duration, deviation),
            change_pct,
            trend_pct,
        });

        state = Some(next);
    }

    Ok(metrics)
}
