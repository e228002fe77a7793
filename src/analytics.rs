//! Option chain analytics: per-strike ratios, changes and time value.
//!
//! [`derive_analytics`] is a pure transform from a cached
//! [`OptionChainData`] snapshot to an [`AnalyticsTable`]. Missing legs and
//! missing fields read as zero. Divisions by a zero denominator yield `0`
//! rather than an error.

use crate::types::analytics::{AnalyticsRow, AnalyticsTable, ChainTotals};
use crate::types::enums::OptionType;
use crate::types::option_chain::{OptionChainData, OptionData, StrikeData};

/// Round to two decimals, ties to even (`0.125` becomes `0.12`).
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Percentage change from `previous` to `current`; `0` when `previous` is zero.
pub fn pct_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// `numerator / denominator`, or `0` unless the denominator is positive.
fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

/// The strike closest to `underlying`; the lowest one wins a tie.
///
/// `strikes` must be ascending, so the first strike seen at the minimum
/// distance is kept.
pub fn atm_strike(strikes: impl IntoIterator<Item = f64>, underlying: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for strike in strikes {
        let distance = (strike - underlying).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((strike, distance)),
        }
    }
    best.map(|(strike, _)| strike)
}

/// Per-side figures at one strike.
struct LegFigures {
    ltp: f64,
    chg_pct: f64,
    oi: i64,
    oi_chg: i64,
    vol: i64,
    iv: f64,
    tv: f64,
}

impl LegFigures {
    fn new(leg: Option<&OptionData>, side: OptionType, underlying: f64, strike: f64) -> Self {
        let empty = OptionData::default();
        let leg = leg.unwrap_or(&empty);
        let oi = leg.open_interest();
        Self {
            ltp: leg.last_price,
            chg_pct: pct_change(leg.last_price, leg.previous_close()),
            oi,
            oi_chg: oi - leg.previous_open_interest(),
            vol: leg.traded_volume(),
            iv: leg.iv(),
            tv: leg.last_price - side.intrinsic(underlying, strike),
        }
    }
}

fn analyse_strike(strike: f64, data: &StrikeData, underlying: f64) -> AnalyticsRow {
    let call = LegFigures::new(data.ce.as_ref(), OptionType::CALL, underlying, strike);
    let put = LegFigures::new(data.pe.as_ref(), OptionType::PUT, underlying, strike);

    AnalyticsRow {
        strike,
        pcr_oi: round2(ratio(put.oi, call.oi)),
        pcr_vol: round2(ratio(put.vol, call.vol)),
        call_iv: round2(call.iv),
        call_tv: round2(call.tv),
        call_oi_chg: call.oi_chg,
        call_oi: call.oi,
        call_vol: call.vol,
        call_chg_pct: round2(call.chg_pct),
        call_ltp: round2(call.ltp),
        put_ltp: round2(put.ltp),
        put_chg_pct: round2(put.chg_pct),
        put_vol: put.vol,
        put_oi: put.oi,
        put_oi_chg: put.oi_chg,
        put_tv: round2(put.tv),
        put_iv: round2(put.iv),
    }
}

/// Derive the analytics table of a chain snapshot.
///
/// One row per distinct strike, ascending. Totals sum the unrounded counts.
pub fn derive_analytics(snapshot: &OptionChainData) -> AnalyticsTable {
    let underlying = snapshot.last_price;

    let chain: Vec<AnalyticsRow> = snapshot
        .oc
        .iter()
        .map(|(strike, data)| analyse_strike(strike.value(), data, underlying))
        .collect();

    let mut totals = ChainTotals::default();
    for row in &chain {
        totals.total_call_oi += row.call_oi;
        totals.total_call_vol += row.call_vol;
        totals.total_put_oi += row.put_oi;
        totals.total_put_vol += row.put_vol;
        totals.total_call_oi_chg += row.call_oi_chg;
        totals.total_put_oi_chg += row.put_oi_chg;
    }
    totals.total_pcr_oi = round2(ratio(totals.total_put_oi, totals.total_call_oi));
    totals.total_pcr_vol = round2(ratio(totals.total_put_vol, totals.total_call_vol));

    AnalyticsTable {
        underlying_price: underlying,
        atm_strike: atm_strike(chain.iter().map(|r| r.strike), underlying),
        chain,
        totals,
    }
}
