//! Full-history recompute — re-derive every stored row from its closes.
//!
//! The daily batch only ever touches the newest row per instrument.
//! Historical rows are corrected here: the stored close series is re-run
//! through the classifier and every derived field is overwritten. Ranks and
//! sparkline windows are preserved as stored — ranks belong to the per-date
//! rank pass, and the window is maintained incrementally by the batch.

use fishbowl_core::domain::{DailyRecord, PricePoint};
use fishbowl_core::signal::classify;

use crate::store::RecordStore;

/// Outcome of a recompute pass.
#[derive(Debug)]
pub struct RecomputeSummary {
    pub symbols: usize,
    pub succeeded: usize,
    pub rows_updated: usize,
    pub failures: Vec<(String, String)>,
}

/// Re-derive all metric fields for the given symbols from stored closes.
///
/// Per-symbol failures (no stored rows, invalid stored closes) are collected
/// and do not stop the pass.
pub fn recalculate_history(store: &dyn RecordStore, symbols: &[String]) -> RecomputeSummary {
    let mut summary = RecomputeSummary {
        symbols: symbols.len(),
        succeeded: 0,
        rows_updated: 0,
        failures: Vec::new(),
    };

    for symbol in symbols {
        match recalculate_symbol(store, symbol) {
            Ok(updated) => {
                summary.succeeded += 1;
                summary.rows_updated += updated;
            }
            Err(message) => summary.failures.push((symbol.clone(), message)),
        }
    }

    summary
}

fn recalculate_symbol(store: &dyn RecordStore, symbol: &str) -> Result<usize, String> {
    let history = store.history(symbol).map_err(|e| e.to_string())?;
    if history.is_empty() {
        return Err("no stored rows".into());
    }

    let points: Vec<PricePoint> = history
        .iter()
        .map(|r| PricePoint::new(r.metric.date, r.metric.close_price))
        .collect();

    let metrics = classify(symbol, &points).map_err(|e| e.to_string())?;

    let updated: Vec<DailyRecord> = history
        .into_iter()
        .zip(metrics)
        .map(|(old, metric)| DailyRecord {
            metric,
            trend_rank: old.trend_rank,
            sparkline: old.sparkline,
        })
        .collect();

    let count = updated.len();
    store
        .upsert_many(symbol, &updated)
        .map_err(|e| e.to_string())?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use chrono::NaiveDate;
    use fishbowl_core::domain::{DailyMetric, SignalTag, TrendStatus};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_store() -> (PathBuf, JsonStore) {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir =
            std::env::temp_dir().join(format!("fishbowl_recompute_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        (dir.clone(), JsonStore::new(dir))
    }

    /// A stored row with deliberately wrong derived fields.
    fn dirty_record(day: u32, close: f64) -> DailyRecord {
        DailyRecord {
            metric: DailyMetric {
                date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                close_price: close,
                ma20_price: -1.0,
                status: TrendStatus::No,
                deviation_pct: 99.0,
                duration_days: 999,
                signal_tag: SignalTag::ExtremeBear,
                change_pct: None,
                trend_pct: None,
            },
            trend_rank: Some(4),
            sparkline: Vec::new(),
        }
    }

    #[test]
    fn recompute_rewrites_derived_fields_and_keeps_rank() {
        let (dir, store) = temp_store();

        // Rising closes: the recomputed status must become YES with a
        // correct MA20, replacing the dirty stored values.
        for (i, close) in [100.0, 103.0, 106.0, 109.0].iter().enumerate() {
            store
                .upsert("A", &dirty_record(4 + i as u32, *close))
                .unwrap();
        }

        let summary = recalculate_history(&store, &["A".to_string()]);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.rows_updated, 4);
        assert!(summary.failures.is_empty());

        let history = store.history("A").unwrap();
        assert_eq!(history[0].metric.ma20_price, 100.0);
        assert_eq!(history[0].metric.status, TrendStatus::Yes);
        assert_eq!(history[0].metric.duration_days, 1);
        assert_eq!(history[3].metric.status, TrendStatus::Yes);
        assert_eq!(history[3].metric.duration_days, 4);
        // Rank survives untouched.
        assert_eq!(history[2].trend_rank, Some(4));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_symbol_is_collected_not_fatal() {
        let (dir, store) = temp_store();

        store.upsert("A", &dirty_record(4, 100.0)).unwrap();

        let summary =
            recalculate_history(&store, &["A".to_string(), "MISSING".to_string()]);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "MISSING");

        let _ = fs::remove_dir_all(&dir);
    }
}
