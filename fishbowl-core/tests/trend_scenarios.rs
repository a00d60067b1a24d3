//! End-to-end classifier scenarios over concrete series.

use chrono::NaiveDate;

use fishbowl_core::domain::{PricePoint, SignalTag, TrendStatus};
use fishbowl_core::signal::classify;

fn make_points(closes: &[f64]) -> Vec<PricePoint> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(base + chrono::Duration::days(i as i64), close))
        .collect()
}

fn assert_approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "actual={actual}, expected={expected}"
    );
}

/// 25 closes rising 0.5%/day from 100.00.
#[test]
fn steady_rise_scenario() {
    let closes: Vec<f64> = (0..25).map(|i| 100.0 * 1.005_f64.powi(i)).collect();
    let metrics = classify("RISE", &make_points(&closes)).unwrap();

    // Day 20 (index 19): MA20 is the mean of days 1-20.
    let want_ma: f64 = closes[..20].iter().sum::<f64>() / 20.0;
    assert_approx(metrics[19].ma20_price, want_ma);

    // The first close equals its own MA20, so the series opens YES; a
    // monotonic rise never re-enters the band from above, so the status
    // holds and the streak runs unbroken.
    for (i, m) in metrics.iter().enumerate() {
        assert_eq!(m.status, TrendStatus::Yes, "status lost at index {i}");
        assert_eq!(m.duration_days, i as u32 + 1);
    }

    // The deviation eventually clears the 1% band and keeps growing.
    let first_breach = metrics
        .iter()
        .position(|m| m.close_price > m.ma20_price * 1.01)
        .expect("rise never cleared the band");
    assert!(first_breach > 0);
    for m in &metrics[first_breach..] {
        assert!(m.deviation_pct > 0.01);
    }

    // Positive deviation throughout the breached region means bullish tags.
    for m in &metrics[first_breach..] {
        assert!(matches!(
            m.signal_tag,
            SignalTag::Breakout | SignalTag::Strong | SignalTag::Overheat
        ));
    }
}

/// A decline flips to NO; a close above the upper band flips back to YES
/// with a fresh one-day streak.
#[test]
fn buffer_breach_flips_with_fresh_streak() {
    // 100 → 97 starts a NO streak (97 < 98.5 * 0.99... band on MA 98.5).
    // The jump to 103 clears MA20 * 1.01 and must flip to YES, duration 1.
    let metrics = classify("FLIP", &make_points(&[100.0, 97.0, 103.0])).unwrap();

    assert_eq!(metrics[1].status, TrendStatus::No);
    assert_eq!(metrics[1].duration_days, 1);

    // ma20 = (100 + 97 + 103) / 3 = 100, upper band 101, close 103.
    assert_approx(metrics[2].ma20_price, 100.0);
    assert_eq!(metrics[2].status, TrendStatus::Yes);
    assert_eq!(metrics[2].duration_days, 1);
    assert_eq!(metrics[2].signal_tag, SignalTag::Breakout);
}

/// A deep slide below -15% deviation reads EXTREME_BEAR; a stretched rally
/// above +15% reads OVERHEAT once the streak is no longer fresh.
#[test]
fn extreme_deviation_tags() {
    // Long flat warmup pins MA20 near 100, then a crash.
    let mut closes = vec![100.0; 20];
    closes.push(80.0);
    let metrics = classify("CRASH", &make_points(&closes)).unwrap();
    let last = metrics.last().unwrap();
    assert!(last.deviation_pct < -0.15);
    assert_eq!(last.signal_tag, SignalTag::ExtremeBear);

    // Flat warmup, then a vertical rally held long enough to leave the
    // BREAKOUT window.
    let mut closes = vec![100.0; 20];
    closes.extend([125.0, 126.0, 127.0, 128.0]);
    let metrics = classify("RALLY", &make_points(&closes)).unwrap();
    let last = metrics.last().unwrap();
    assert_eq!(last.status, TrendStatus::Yes);
    assert!(last.duration_days > 3);
    assert!(last.deviation_pct > 0.15);
    assert_eq!(last.signal_tag, SignalTag::Overheat);
}

/// trend_pct measures from the day before the streak began and is absent
/// when that day predates available history.
#[test]
fn trend_pct_lookback() {
    // Indices: 0-2 flat YES streak from day 0; day 3 crashes to 90 (NO,
    // duration 1, lookback index 2 → close 100); day 4 keeps falling (NO,
    // duration 2, lookback index 2 as well).
    let metrics = classify("TREND", &make_points(&[100.0, 100.0, 100.0, 90.0, 85.0])).unwrap();

    assert_eq!(metrics[0].trend_pct, None);
    assert_eq!(metrics[2].trend_pct, None);

    assert_eq!(metrics[3].status, TrendStatus::No);
    assert_approx(metrics[3].trend_pct.unwrap(), -0.10);

    assert_eq!(metrics[4].duration_days, 2);
    assert_approx(metrics[4].trend_pct.unwrap(), -0.15);
}
