//! Reversal ladder and opening snapshot capture.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use dhan_oc_cache::ladder::{compute_ladder, parse_expiry, reversal, year_fraction};
use dhan_oc_cache::types::opening::{LegPrices, OpeningSnapshot, StrikeLevel};
use dhan_oc_cache::types::option_chain::{OptionChainData, Strike};

const RATE: f64 = -0.067;

fn ist(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(19_800)
        .unwrap()
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .unwrap()
}

fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, mo, d).unwrap()
}

fn legs(put_ltp: f64, call_ltp: f64) -> Option<LegPrices> {
    Some(LegPrices { put_ltp, call_ltp })
}

/// The parity formula, written out independently of the crate.
fn expected(strike: f64, put: f64, call: f64, spot: f64, t: f64) -> f64 {
    strike + (spot - strike + put - call + strike * (1.0 - (RATE * t).exp()))
}

// ===================================================================
// Year fraction
// ===================================================================

#[test]
fn test_year_fraction_rounds_days_up() {
    let now = ist(2026, 10, 16, 9, 30, 0);
    // 4 days 6 hours to the 15:30 close.
    assert_eq!(year_fraction(date(2026, 10, 20), &now), 5.0 / 365.0);
    // Expiry day itself: 6 hours left still counts as a day.
    assert_eq!(year_fraction(date(2026, 10, 16), &now), 1.0 / 365.0);
}

#[test]
fn test_year_fraction_is_zero_after_close() {
    assert_eq!(year_fraction(date(2026, 10, 16), &ist(2026, 10, 16, 15, 30, 0)), 0.0);
    assert_eq!(year_fraction(date(2026, 10, 16), &ist(2026, 10, 16, 15, 45, 0)), 0.0);
    assert_eq!(year_fraction(date(2026, 10, 15), &ist(2026, 10, 16, 9, 30, 0)), 0.0);
}

#[test]
fn test_year_fraction_is_timezone_independent() {
    let local = ist(2026, 10, 16, 9, 30, 0);
    let utc = Utc.with_ymd_and_hms(2026, 10, 16, 4, 0, 0).unwrap();
    assert_eq!(
        year_fraction(date(2026, 10, 22), &local),
        year_fraction(date(2026, 10, 22), &utc)
    );
}

#[test]
fn test_parse_expiry() {
    assert_eq!(parse_expiry("2026-10-20"), Some(date(2026, 10, 20)));
    assert_eq!(parse_expiry("20-10-2026"), None);
    assert_eq!(parse_expiry(""), None);
}

// ===================================================================
// Ladder
// ===================================================================

#[test]
fn test_reversal_formula() {
    let t = 5.0 / 365.0;
    let got = reversal(24_800.0, legs(61.2, 112.4), 24_850.5, RATE, t);
    assert_eq!(got, expected(24_800.0, 61.2, 112.4, 24_850.5, t));
    assert_eq!(reversal(24_800.0, None, 24_850.5, RATE, t), 0.0);
}

#[test]
fn test_single_strike_uses_default_step() {
    let t = 3.0 / 365.0;
    let strikes = BTreeMap::from([(Strike(100.0), legs(3.0, 5.0))]);

    let ladder = compute_ladder(&strikes, 101.0, RATE, t);
    assert_eq!(ladder.len(), 1);
    assert_eq!(
        ladder[&Strike(100.0)],
        StrikeLevel::new(
            expected(50.0, 3.0, 5.0, 101.0, t),
            expected(150.0, 3.0, 5.0, 101.0, t),
        )
    );
}

#[test]
fn test_ladder_links_neighbouring_strikes() {
    let t = 2.0 / 365.0;
    let spot = 24_812.0;
    let strikes = BTreeMap::from([
        (Strike(24_800.0), legs(70.0, 82.0)),
        (Strike(24_700.0), legs(35.0, 145.0)),
        (Strike(24_900.0), legs(130.0, 40.0)),
    ]);

    let ladder = compute_ladder(&strikes, spot, RATE, t);
    let keys: Vec<f64> = ladder.keys().map(|k| k.value()).collect();
    assert_eq!(keys, vec![24_700.0, 24_800.0, 24_900.0]);

    // Step 100: synthetic 24600 below, 24900 + 100 above.
    assert_eq!(
        ladder[&Strike(24_700.0)],
        StrikeLevel::new(
            expected(24_600.0, 35.0, 145.0, spot, t),
            expected(24_800.0, 70.0, 82.0, spot, t),
        )
    );
    assert_eq!(
        ladder[&Strike(24_800.0)],
        StrikeLevel::new(
            expected(24_800.0, 70.0, 82.0, spot, t),
            expected(24_900.0, 130.0, 40.0, spot, t),
        )
    );
    assert_eq!(
        ladder[&Strike(24_900.0)],
        StrikeLevel::new(
            expected(24_900.0, 130.0, 40.0, spot, t),
            expected(25_000.0, 130.0, 40.0, spot, t),
        )
    );
}

#[test]
fn test_missing_leg_yields_zero() {
    let t = 1.0 / 365.0;
    let strikes = BTreeMap::from([
        (Strike(100.0), legs(2.0, 4.0)),
        (Strike(110.0), None),
        (Strike(120.0), legs(9.0, 1.0)),
    ]);

    let ladder = compute_ladder(&strikes, 108.0, RATE, t);
    assert_eq!(ladder[&Strike(100.0)].resistance, "0.0000");
    assert_eq!(ladder[&Strike(110.0)].support, "0.0000");
    assert_eq!(
        ladder[&Strike(110.0)].resistance,
        format!("{:.4}", expected(120.0, 9.0, 1.0, 108.0, t))
    );
}

#[test]
fn test_past_expiry_yields_all_zero_ladder() {
    let strikes = BTreeMap::from([
        (Strike(100.0), legs(2.0, 4.0)),
        (Strike(110.0), legs(5.0, 3.0)),
    ]);
    for t in [0.0, -1.0 / 365.0] {
        let ladder = compute_ladder(&strikes, 105.0, RATE, t);
        assert_eq!(ladder.len(), 2);
        assert!(ladder.values().all(|l| *l == StrikeLevel::new(0.0, 0.0)));
    }
}

#[test]
fn test_levels_are_four_decimal_strings() {
    let level = StrikeLevel::new(24_790.123_456, 3.0);
    assert_eq!(level.support, "24790.1235");
    assert_eq!(level.resistance, "3.0000");
}

// ===================================================================
// Opening snapshot
// ===================================================================

fn opening_chain() -> OptionChainData {
    serde_json::from_value(serde_json::json!({
        "last_price": 24_850.5,
        "oc": {
            "24800.000000": {
                "ce": {"last_price": 112.4, "oi": 1000},
                "pe": {"last_price": 61.2, "oi": 900}
            },
            "24850.000000": {
                "ce": {"last_price": 80.0}
            },
            "24900.000000": {
                "ce": {"last_price": 55.0},
                "pe": {"last_price": 104.6}
            }
        }
    }))
    .unwrap()
}

#[test]
fn test_capture_opening_snapshot() {
    let now = ist(2026, 10, 16, 9, 30, 5);
    let snapshot = OpeningSnapshot::capture(&opening_chain(), "2026-10-20", &now, RATE);

    assert_eq!(snapshot.underlying_price, 24_850.5);
    assert_eq!(snapshot.date, "2026-10-16");
    // Strikes missing a leg are left out of the price map but keep a ladder row.
    assert_eq!(snapshot.strikes.len(), 2);
    assert_eq!(
        snapshot.strikes[&Strike(24_800.0)],
        LegPrices { put_ltp: 61.2, call_ltp: 112.4 }
    );
    assert_eq!(snapshot.strike_levels.len(), 3);

    let t = 5.0 / 365.0;
    assert_eq!(
        snapshot.strike_levels[&Strike(24_800.0)],
        StrikeLevel::new(expected(24_750.0, 61.2, 112.4, 24_850.5, t), 0.0)
    );
    assert_eq!(
        snapshot.strike_levels[&Strike(24_900.0)],
        StrikeLevel::new(
            expected(24_900.0, 104.6, 55.0, 24_850.5, t),
            expected(24_950.0, 104.6, 55.0, 24_850.5, t),
        )
    );
}

#[test]
fn test_capture_date_is_market_local() {
    // 2026-10-16 23:00 UTC is already the 17th in Mumbai.
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 23, 0, 0).unwrap();
    let snapshot = OpeningSnapshot::capture(&opening_chain(), "2026-10-22", &now, RATE);
    assert_eq!(snapshot.date, "2026-10-17");
}

#[test]
fn test_capture_with_unparseable_expiry_zeroes_ladder() {
    let now = ist(2026, 10, 16, 9, 30, 0);
    let snapshot = OpeningSnapshot::capture(&opening_chain(), "next week", &now, RATE);
    assert_eq!(snapshot.strikes.len(), 2);
    assert!(
        snapshot
            .strike_levels
            .values()
            .all(|l| l.support == "0.0000" && l.resistance == "0.0000")
    );
}

#[test]
fn test_opening_snapshot_wire_format() {
    let now = ist(2026, 10, 16, 9, 30, 0);
    let snapshot = OpeningSnapshot::capture(&opening_chain(), "2026-10-20", &now, RATE);
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["s"], 24_850.5);
    assert_eq!(json["date"], "2026-10-16");
    assert_eq!(json["strikes"]["24800.000000"]["p"], 61.2);
    assert_eq!(json["strikes"]["24800.000000"]["c"], 112.4);
    assert!(json["strikes"].get("24850.000000").is_none());
    assert!(json["strikeLevels"]["24850.000000"]["support"].is_string());

    let back: OpeningSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back, snapshot);
}
