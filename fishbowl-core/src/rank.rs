//! Per-date trend ranking.
//!
//! Instruments sharing a date are ranked by |deviation| descending: the
//! furthest from its average — in either direction — ranks first. Dense
//! ranking: equal |deviation| shares a rank and the next distinct value
//! takes the next integer. Ties are ordered lexically by symbol so output
//! is deterministic. Absent or non-finite deviations are excluded, not
//! ranked last.

use std::collections::BTreeMap;

/// Compute dense ranks for one date's records.
pub fn rank_by_deviation(entries: &[(String, Option<f64>)]) -> BTreeMap<String, u32> {
    let mut ranked: Vec<(&str, f64)> = entries
        .iter()
        .filter_map(|(symbol, dev)| {
            dev.filter(|d| d.is_finite())
                .map(|d| (symbol.as_str(), d.abs()))
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .expect("finite deviations always compare")
            .then_with(|| a.0.cmp(b.0))
    });

    let mut ranks = BTreeMap::new();
    let mut rank = 0u32;
    let mut prev_abs: Option<f64> = None;

    for (symbol, abs_dev) in ranked {
        if prev_abs != Some(abs_dev) {
            rank += 1;
            prev_abs = Some(abs_dev);
        }
        ranks.insert(symbol.to_string(), rank);
    }

    ranks
}
