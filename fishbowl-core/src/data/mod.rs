//! Instrument configuration, data providers, and series normalization.

pub mod config;
pub mod csv_import;
pub mod normalize;
pub mod provider;
pub mod tushare;

pub use config::{Instrument, MonitorConfig};
pub use csv_import::CsvProvider;
pub use normalize::normalize_series;
pub use provider::{
    DataProvider, ProgressReporter, ProviderError, RawSeries, SilentProgress, StdoutProgress,
};
pub use tushare::TushareProvider;
