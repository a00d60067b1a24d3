//! Sparkline window — bounded rolling history maintained incrementally.
//!
//! The window is persisted as a JSON array and merged with today's point on
//! every run, so daily updates never re-fetch full history. Two rules keep
//! it consistent under re-runs: an append whose date matches the stored tail
//! replaces the tail (same-day corrections), and the window is truncated to
//! the newest `MAX_POINTS` after every append.
//!
//! Prior persisted state is untrusted: a blob that fails to parse is
//! discarded with a warning and the window restarts empty. That is a
//! recoverable anomaly, never an error — unlike validation failures on
//! freshly fetched data.

use crate::domain::{DailyMetric, SparklinePoint};

/// Maximum number of points retained in a window.
pub const MAX_POINTS: usize = 250;

/// Below this many stored points the window is rebuilt from full history
/// instead of appended to.
pub const MIN_VIABLE_POINTS: usize = 20;

/// Deserialize a persisted window blob, self-healing on corrupt input.
///
/// Absent or malformed input yields an empty window. Points that would
/// violate date monotonicity are dropped rather than reordered, so whatever
/// comes back always satisfies the window invariants.
pub fn parse_window(raw: Option<&str>) -> Vec<SparklinePoint> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let parsed: Vec<SparklinePoint> = match serde_json::from_str(raw) {
        Ok(points) => points,
        Err(e) => {
            eprintln!("WARNING: discarding corrupt sparkline state: {e}");
            return Vec::new();
        }
    };

    let mut window: Vec<SparklinePoint> = Vec::with_capacity(parsed.len());
    for point in parsed {
        match window.last() {
            Some(last) if point.date <= last.date => {
                eprintln!(
                    "WARNING: discarding out-of-order sparkline point {}",
                    point.date
                );
            }
            _ => window.push(point),
        }
    }
    window
}

/// Merge today's point into the window.
///
/// Same date as the tail → replace (idempotent re-run for the trading day).
/// Newer date → append. Older date → stale, ignored. The result is then
/// truncated to the newest `max_len` points.
pub fn append(
    mut window: Vec<SparklinePoint>,
    point: SparklinePoint,
    max_len: usize,
) -> Vec<SparklinePoint> {
    match window.last() {
        Some(last) if point.date == last.date => {
            *window.last_mut().unwrap() = point;
        }
        Some(last) if point.date < last.date => {
            eprintln!(
                "WARNING: ignoring stale sparkline append for {} (window ends {})",
                point.date, last.date
            );
        }
        _ => window.push(point),
    }

    if window.len() > max_len {
        window.drain(..window.len() - max_len);
    }
    window
}

/// Build an initial window from full classified history.
///
/// Only used when no viable window is stored; the incremental path is
/// preferred on every later run.
pub fn initialize(history: &[DailyMetric], max_len: usize) -> Vec<SparklinePoint> {
    let start = history.len().saturating_sub(max_len);
    history[start..]
        .iter()
        .map(|m| SparklinePoint::new(m.date, m.close_price, m.ma20_price))
        .collect()
}

/// Whether a stored window is too short to trust for incremental updates.
pub fn needs_initialization(window: &[SparklinePoint]) -> bool {
    window.len() < MIN_VIABLE_POINTS
}

/// Serialize a window for persistence.
pub fn to_json(window: &[SparklinePoint]) -> String {
    serde_json::to_string(window).expect("sparkline window serialization cannot fail")
}
