//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources (Tushare Pro
//! HTTP, CSV import) so implementations can be swapped and mocked for tests.
//! Providers return their native column-oriented shape; normalization into
//! the canonical `(date, close)` series happens in one place downstream.

use serde_json::Value;
use thiserror::Error;

/// Raw column-oriented series as a provider returns it, before any cleaning.
///
/// Tushare answers with `fields` + `items`; CSV import produces a header and
/// string cells. Both fit this shape, which is the only one the normalizer
/// accepts — providers never hand rows directly to the classifier.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub symbol: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Structured error types for fetch operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from provider for '{symbol}'")]
    HttpStatus { symbol: String, status: u16 },

    #[error("provider rejected request for '{symbol}': {message}")]
    Rejected { symbol: String, message: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("no route configured for category '{category}'")]
    UnknownRoute { category: String },

    #[error("no data file for symbol '{symbol}': {path}")]
    MissingFile { symbol: String, path: String },

    #[error("csv read error for '{0}': {1}")]
    Csv(String, #[source] csv::Error),
}

/// Trait for market-data providers.
///
/// `route` is an opaque routing key resolved from the instrument's category
/// by configuration; a provider interprets it as an endpoint or data-source
/// selector and is free to ignore it.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the daily series for a symbol via the given route.
    fn fetch(&self, symbol: &str, route: &str) -> Result<RawSeries, ProviderError>;
}

/// Progress callbacks for multi-instrument batch runs.
pub trait ProgressReporter {
    /// Called when an instrument starts processing.
    fn on_start(&self, symbol: &str, name: &str, index: usize, total: usize);

    /// Called when an instrument finishes, with the error text on failure.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, error: Option<&str>);

    /// Called once when the whole batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl ProgressReporter for StdoutProgress {
    fn on_start(&self, symbol: &str, name: &str, index: usize, total: usize) {
        println!("[{}/{}] {name} ({symbol})...", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, error: Option<&str>) {
        match error {
            None => println!("  OK: {symbol}"),
            Some(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nBatch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// No-op reporter for tests and embedding.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn on_start(&self, _symbol: &str, _name: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _symbol: &str, _index: usize, _total: usize, _error: Option<&str>) {}
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
