//! JSON record store with per-symbol directories.
//!
//! Layout: `{root}/symbol={SYMBOL}/records.json` — a date-keyed map of daily
//! records — plus `meta.json` (date range, row count, blake3 content hash)
//! and `sparkline.json`, the raw window blob consumed by the incremental
//! sparkline path.
//!
//! Writes are atomic (write to .tmp, rename into place). A records file
//! that fails to parse is quarantined as `records.json.corrupt` and treated
//! as empty rather than failing the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use fishbowl_core::domain::DailyRecord;

/// Errors from the store itself (I/O and serialization faults).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no record for '{symbol}' on {date}")]
    MissingRecord { symbol: String, date: NaiveDate },
}

/// Persistence seam consumed by the batch and recompute passes.
///
/// Upserts are keyed on `(symbol, date)` with update-on-conflict semantics.
/// `prior_window` never fails: corrupt or unreadable state reads as absent,
/// leaving the self-heal decision to the sparkline layer.
pub trait RecordStore {
    fn upsert(&self, symbol: &str, record: &DailyRecord) -> Result<(), StoreError>;

    /// Replace-or-insert a batch of rows for one symbol in a single write.
    fn upsert_many(&self, symbol: &str, records: &[DailyRecord]) -> Result<(), StoreError> {
        for record in records {
            self.upsert(symbol, record)?;
        }
        Ok(())
    }

    /// All stored rows for a symbol, ascending by date. Empty if none.
    fn history(&self, symbol: &str) -> Result<Vec<DailyRecord>, StoreError>;

    /// The raw persisted sparkline blob for a symbol, if any.
    fn prior_window(&self, symbol: &str) -> Option<String>;

    /// Symbols present in the store, sorted.
    fn symbols(&self) -> Result<Vec<String>, StoreError>;

    /// Every symbol's row for one date.
    fn records_for(&self, date: NaiveDate) -> Result<Vec<(String, DailyRecord)>, StoreError>;

    /// Write a rank onto an existing row.
    fn set_rank(&self, symbol: &str, date: NaiveDate, rank: u32) -> Result<(), StoreError>;
}

/// Metadata sidecar for a stored symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub row_count: usize,
    pub data_hash: String,
    pub updated_at: chrono::NaiveDateTime,
}

/// Store status for one symbol, as reported by the CLI.
#[derive(Debug, Clone)]
pub struct StoreStatus {
    pub symbol: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub row_count: Option<usize>,
}

type RecordMap = BTreeMap<NaiveDate, DailyRecord>;

/// The JSON-file record store.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("symbol={symbol}"))
    }

    fn records_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join("records.json")
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join("meta.json")
    }

    fn window_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join("sparkline.json")
    }

    /// Load the record map for a symbol, quarantining a corrupt file.
    fn load_records(&self, symbol: &str) -> Result<RecordMap, StoreError> {
        let path = self.records_path(symbol);
        if !path.exists() {
            return Ok(RecordMap::new());
        }

        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                let quarantine = path.with_extension("json.corrupt");
                eprintln!(
                    "WARNING: quarantining corrupt record file {}: {e}",
                    path.display()
                );
                let _ = fs::rename(&path, &quarantine);
                Ok(RecordMap::new())
            }
        }
    }

    /// Persist the record map and refresh the metadata sidecar.
    fn write_records(&self, symbol: &str, records: &RecordMap) -> Result<(), StoreError> {
        let dir = self.symbol_dir(symbol);
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string(records)?;
        atomic_write(&self.records_path(symbol), json.as_bytes())?;

        if let (Some(first), Some(last)) = (records.keys().next(), records.keys().next_back()) {
            let meta = StoreMeta {
                symbol: symbol.to_string(),
                start_date: *first,
                end_date: *last,
                row_count: records.len(),
                data_hash: blake3::hash(json.as_bytes()).to_hex().to_string(),
                updated_at: chrono::Local::now().naive_local(),
            };
            let meta_json = serde_json::to_string_pretty(&meta)?;
            atomic_write(&self.meta_path(symbol), meta_json.as_bytes())?;
        }

        Ok(())
    }

    /// Read the metadata sidecar for a symbol.
    pub fn get_meta(&self, symbol: &str) -> Option<StoreMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Status rows for the CLI listing.
    pub fn status(&self) -> Result<Vec<StoreStatus>, StoreError> {
        Ok(self
            .symbols()?
            .into_iter()
            .map(|symbol| {
                let meta = self.get_meta(&symbol);
                StoreStatus {
                    symbol,
                    start_date: meta.as_ref().map(|m| m.start_date),
                    end_date: meta.as_ref().map(|m| m.end_date),
                    row_count: meta.as_ref().map(|m| m.row_count),
                }
            })
            .collect())
    }
}

impl RecordStore for JsonStore {
    fn upsert(&self, symbol: &str, record: &DailyRecord) -> Result<(), StoreError> {
        let mut records = self.load_records(symbol)?;
        records.insert(record.metric.date, record.clone());
        self.write_records(symbol, &records)?;

        if !record.sparkline.is_empty() {
            let blob = fishbowl_core::sparkline::to_json(&record.sparkline);
            atomic_write(&self.window_path(symbol), blob.as_bytes())?;
        }

        Ok(())
    }

    fn upsert_many(&self, symbol: &str, batch: &[DailyRecord]) -> Result<(), StoreError> {
        let mut records = self.load_records(symbol)?;
        for record in batch {
            records.insert(record.metric.date, record.clone());
        }
        self.write_records(symbol, &records)
    }

    fn history(&self, symbol: &str) -> Result<Vec<DailyRecord>, StoreError> {
        Ok(self.load_records(symbol)?.into_values().collect())
    }

    fn prior_window(&self, symbol: &str) -> Option<String> {
        fs::read_to_string(self.window_path(symbol)).ok()
    }

    fn symbols(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(symbol) = name.strip_prefix("symbol=") {
                symbols.push(symbol.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    fn records_for(&self, date: NaiveDate) -> Result<Vec<(String, DailyRecord)>, StoreError> {
        let mut out = Vec::new();
        for symbol in self.symbols()? {
            if let Some(record) = self.load_records(&symbol)?.remove(&date) {
                out.push((symbol, record));
            }
        }
        Ok(out)
    }

    fn set_rank(&self, symbol: &str, date: NaiveDate, rank: u32) -> Result<(), StoreError> {
        let mut records = self.load_records(symbol)?;
        let record = records
            .get_mut(&date)
            .ok_or_else(|| StoreError::MissingRecord {
                symbol: symbol.to_string(),
                date,
            })?;
        record.trend_rank = Some(rank);
        self.write_records(symbol, &records)
    }
}

/// Write a file atomically: write to `.tmp`, then rename into place.
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::Io(e)
    })
}
