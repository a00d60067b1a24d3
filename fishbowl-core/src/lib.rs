//! Fishbowl Core — trend classification engine for daily price series.
//!
//! This crate contains the algorithmic heart of the fishbowl trend radar:
//! - Domain types (price points, daily metric records, sparkline points)
//! - Series normalization from provider-native shapes
//! - The MA20 ±1% hysteresis state machine with streak tracking,
//!   deviation, and tiered signal tags
//! - Bounded incremental sparkline windows
//! - Per-date deviation ranking
//! - Data provider trait with Tushare Pro and CSV implementations
//! - Instrument configuration with category-based provider routing

pub mod data;
pub mod domain;
pub mod rank;
pub mod signal;
pub mod sparkline;
