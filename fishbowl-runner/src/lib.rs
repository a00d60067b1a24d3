//! Fishbowl Runner — persistence and batch orchestration.
//!
//! This crate builds on `fishbowl-core` to provide:
//! - A per-symbol JSON record store with atomic writes and metadata sidecars
//! - The sequential daily batch (fetch → normalize → classify → window → upsert)
//! - The per-date rank pass
//! - Full-history recompute over stored closes

pub mod batch;
pub mod recompute;
pub mod store;

pub use batch::{run_daily_batch, update_ranks_for, BatchError, InstrumentFailure, RunSummary};
pub use recompute::{recalculate_history, RecomputeSummary};
pub use store::{JsonStore, RecordStore, StoreError, StoreStatus};
