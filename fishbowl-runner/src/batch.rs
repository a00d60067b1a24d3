//! Daily batch — the end-to-end pipeline over configured instruments.
//!
//! Instruments are processed one at a time, in config order. One
//! instrument's failure never aborts the rest: failures are collected into
//! the run summary. The batch as a whole fails only when *zero* instruments
//! succeed, which separates "one bad feed" from a systemic outage.
//!
//! Ranking is a distinct phase that runs only after every record for the
//! run date has been upserted.

use chrono::NaiveDate;
use thiserror::Error;

use fishbowl_core::data::{
    normalize_series, DataProvider, MonitorConfig, ProgressReporter, ProviderError,
};
use fishbowl_core::domain::{DailyRecord, SeriesError, SparklinePoint};
use fishbowl_core::rank::rank_by_deviation;
use fishbowl_core::signal::classify;
use fishbowl_core::sparkline;

use crate::store::{RecordStore, StoreError};

/// Batch-level failure: every configured instrument failed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("all {attempted} instruments failed; no records written")]
    Exhausted { attempted: usize },
}

/// One instrument's failure, as reported in the run summary.
#[derive(Debug, Clone)]
pub struct InstrumentFailure {
    pub symbol: String,
    pub kind: String,
    pub message: String,
}

/// Outcome of a daily batch run.
#[derive(Debug)]
pub struct RunSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Latest trading date seen across successful instruments; the date the
    /// rank pass covered.
    pub run_date: Option<NaiveDate>,
    pub failures: Vec<InstrumentFailure>,
}

/// Errors a single instrument can hit inside the batch loop.
#[derive(Debug, Error)]
enum InstrumentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InstrumentError {
    fn kind(&self) -> &'static str {
        match self {
            InstrumentError::Provider(ProviderError::UnknownRoute { .. }) => "unknown_route",
            InstrumentError::Provider(_) => "fetch",
            InstrumentError::Series(e) => e.kind(),
            InstrumentError::Store(_) => "store",
        }
    }
}

/// Run the daily batch: fetch, classify, merge the sparkline window, and
/// upsert the newest record for every active instrument, then rank the run
/// date.
pub fn run_daily_batch(
    config: &MonitorConfig,
    provider: &dyn DataProvider,
    store: &dyn RecordStore,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary, BatchError> {
    let instruments = config.active_instruments();
    let total = instruments.len();

    let mut summary = RunSummary {
        processed: total,
        succeeded: 0,
        failed: 0,
        run_date: None,
        failures: Vec::new(),
    };

    for (i, instrument) in instruments.iter().enumerate() {
        progress.on_start(&instrument.symbol, &instrument.name, i, total);

        match process_instrument(config, provider, store, &instrument.symbol, &instrument.category)
        {
            Ok(date) => {
                progress.on_complete(&instrument.symbol, i, total, None);
                summary.succeeded += 1;
                summary.run_date = summary.run_date.max(Some(date));
            }
            Err(e) => {
                progress.on_complete(&instrument.symbol, i, total, Some(&e.to_string()));
                summary.failed += 1;
                summary.failures.push(InstrumentFailure {
                    symbol: instrument.symbol.clone(),
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    progress.on_batch_complete(summary.succeeded, summary.failed, total);

    if summary.succeeded == 0 && total > 0 {
        return Err(BatchError::Exhausted { attempted: total });
    }

    if let Some(date) = summary.run_date {
        if let Err(e) = update_ranks_for(store, date) {
            summary.failures.push(InstrumentFailure {
                symbol: "*".into(),
                kind: "rank_update".into(),
                message: e.to_string(),
            });
        }
    }

    Ok(summary)
}

/// Fetch → normalize → classify → window merge → upsert for one instrument.
///
/// Returns the trading date of the upserted record.
fn process_instrument(
    config: &MonitorConfig,
    provider: &dyn DataProvider,
    store: &dyn RecordStore,
    symbol: &str,
    category: &str,
) -> Result<NaiveDate, InstrumentError> {
    let route = config
        .route_for(category)
        .ok_or_else(|| ProviderError::UnknownRoute {
            category: category.to_string(),
        })?;

    let raw = provider.fetch(symbol, route)?;
    let points = normalize_series(&raw)?;
    let metrics = classify(symbol, &points)?;

    // classify() rejects empty input, so the last metric always exists.
    let latest = metrics.last().expect("non-empty classification").clone();

    let stored = sparkline::parse_window(store.prior_window(symbol).as_deref());
    let window = if sparkline::needs_initialization(&stored) {
        sparkline::initialize(&metrics, sparkline::MAX_POINTS)
    } else {
        sparkline::append(
            stored,
            SparklinePoint::new(latest.date, latest.close_price, latest.ma20_price),
            sparkline::MAX_POINTS,
        )
    };

    let date = latest.date;
    let record = DailyRecord {
        metric: latest,
        trend_rank: None,
        sparkline: window,
    };
    store.upsert(symbol, &record)?;

    Ok(date)
}

/// Recompute dense deviation ranks for every record stored on `date`.
pub fn update_ranks_for(store: &dyn RecordStore, date: NaiveDate) -> Result<usize, StoreError> {
    let records = store.records_for(date)?;
    let entries: Vec<(String, Option<f64>)> = records
        .iter()
        .map(|(symbol, record)| (symbol.clone(), Some(record.metric.deviation_pct)))
        .collect();

    let ranks = rank_by_deviation(&entries);
    for (symbol, rank) in &ranks {
        store.set_rank(symbol, date, *rank)?;
    }
    Ok(ranks.len())
}
