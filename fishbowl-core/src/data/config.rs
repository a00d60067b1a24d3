//! Monitor configuration — the instrument list and category routing table.
//!
//! Stored as a TOML file. Each instrument carries a category; the `[routes]`
//! table maps categories to provider endpoints, so adding a new data source
//! is a config change, not a code change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// One monitored instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub category: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Display/processing order; lower ranks first.
    #[serde(default)]
    pub sort_rank: Option<u32>,
}

fn default_active() -> bool {
    true
}

/// The complete monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub instruments: Vec<Instrument>,
    /// Category → provider route (endpoint name).
    #[serde(default)]
    pub routes: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl MonitorConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Active instruments in processing order: `(sort_rank, symbol)`,
    /// unranked instruments last.
    pub fn active_instruments(&self) -> Vec<&Instrument> {
        let mut active: Vec<&Instrument> =
            self.instruments.iter().filter(|i| i.active).collect();
        active.sort_by(|a, b| {
            let ra = a.sort_rank.unwrap_or(u32::MAX);
            let rb = b.sort_rank.unwrap_or(u32::MAX);
            ra.cmp(&rb).then_with(|| a.symbol.cmp(&b.symbol))
        });
        active
    }

    /// Resolve the provider route for a category.
    pub fn route_for(&self, category: &str) -> Option<&str> {
        self.routes.get(category).map(|s| s.as_str())
    }

    /// A starter configuration covering the broad A-share benchmarks.
    pub fn default_cn() -> Self {
        let instruments = vec![
            ("000300.SH", "CSI 300", "broad", 1),
            ("000905.SH", "CSI 500", "broad", 2),
            ("399006.SZ", "ChiNext", "broad", 3),
            ("512480.SH", "Semiconductor ETF", "industry", 10),
            ("512880.SH", "Securities ETF", "industry", 11),
        ]
        .into_iter()
        .map(|(symbol, name, category, rank)| Instrument {
            symbol: symbol.into(),
            name: name.into(),
            category: category.into(),
            active: true,
            sort_rank: Some(rank),
        })
        .collect();

        let mut routes = BTreeMap::new();
        routes.insert("broad".into(), "index_daily".into());
        routes.insert("industry".into(), "fund_daily".into());
        routes.insert("global".into(), "index_global".into());
        routes.insert("metal".into(), "sge_daily".into());

        Self { instruments, routes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_routes_all_categories() {
        let cfg = MonitorConfig::default_cn();
        for inst in &cfg.instruments {
            assert!(
                cfg.route_for(&inst.category).is_some(),
                "category '{}' has no route",
                inst.category
            );
        }
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = MonitorConfig::default_cn();
        let toml_str = cfg.to_toml().unwrap();
        let parsed = MonitorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(cfg.instruments.len(), parsed.instruments.len());
        assert_eq!(cfg.routes, parsed.routes);
    }

    #[test]
    fn active_instruments_ordered_by_sort_rank_then_symbol() {
        let cfg = MonitorConfig::from_toml(
            r#"
            [[instruments]]
            symbol = "B"
            name = "b"
            category = "broad"
            sort_rank = 2

            [[instruments]]
            symbol = "C"
            name = "c"
            category = "broad"

            [[instruments]]
            symbol = "A"
            name = "a"
            category = "broad"
            sort_rank = 2

            [[instruments]]
            symbol = "D"
            name = "d"
            category = "broad"
            active = false

            [routes]
            broad = "index_daily"
            "#,
        )
        .unwrap();

        let order: Vec<&str> = cfg
            .active_instruments()
            .iter()
            .map(|i| i.symbol.as_str())
            .collect();
        // Tied sort_rank falls back to symbol order; unranked sorts last;
        // inactive excluded.
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn active_defaults_to_true() {
        let cfg = MonitorConfig::from_toml(
            r#"
            [[instruments]]
            symbol = "X"
            name = "x"
            category = "broad"
            "#,
        )
        .unwrap();
        assert!(cfg.instruments[0].active);
    }
}
