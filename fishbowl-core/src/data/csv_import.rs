//! CSV import provider — offline data source for testing and backfill.
//!
//! Reads `{dir}/{symbol}.csv` with a header row. Cells are passed through as
//! strings; the normalizer handles date formats and numeric coercion exactly
//! as it does for HTTP responses, so the two paths cannot drift apart.

use serde_json::Value;
use std::path::PathBuf;

use super::provider::{DataProvider, ProviderError, RawSeries};

/// File-per-symbol CSV provider.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, symbol: &str, _route: &str) -> Result<RawSeries, ProviderError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(ProviderError::MissingFile {
                symbol: symbol.to_string(),
                path: path.display().to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| ProviderError::Csv(symbol.to_string(), e))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| ProviderError::Csv(symbol.to_string(), e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ProviderError::Csv(symbol.to_string(), e))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| {
                        let cell = cell.trim();
                        if cell.is_empty() {
                            Value::Null
                        } else {
                            Value::String(cell.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(RawSeries {
            symbol: symbol.to_string(),
            columns,
            rows,
        })
    }
}
