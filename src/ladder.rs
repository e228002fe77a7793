//! Reversal (put-call parity) support/resistance ladder.
//!
//! For a strike `K` with opening put and call prices `P` and `C`, opening
//! underlying `S`, rate `r` and year fraction `t`:
//!
//! ```text
//! reversal(K) = K + (S - K + P - C + K * (1 - e^(r * t)))
//! ```
//!
//! Each strike's support is the reversal of the strike itself and its
//! resistance the reversal of the next strike up. The ends use synthetic
//! strikes one step beyond the chain, carrying the end strike's prices.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};

use crate::clock::market_offset;
use crate::constants::{
    DATE_FORMAT, DAYS_PER_YEAR, DEFAULT_STRIKE_STEP, MARKET_CLOSE, MILLIS_PER_DAY,
};
use crate::types::opening::{LegPrices, OpeningSnapshot, StrikeLevel};
use crate::types::option_chain::{OptionChainData, Strike};

/// Parse an expiry in `YYYY-MM-DD` form.
pub fn parse_expiry(expiry: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(expiry.trim(), DATE_FORMAT).ok()
}

/// Years until market close on `expiry`, counted in whole days rounded up.
///
/// `0` once the close has passed.
pub fn year_fraction<Tz: TimeZone>(expiry: NaiveDate, now: &DateTime<Tz>) -> f64 {
    let (hour, minute) = MARKET_CLOSE;
    let Some(close_time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
        return 0.0;
    };
    let Some(close) = expiry
        .and_time(close_time)
        .and_local_timezone(market_offset())
        .single()
    else {
        return 0.0;
    };

    let remaining_ms = close.signed_duration_since(now.clone()).num_milliseconds();
    if remaining_ms <= 0 {
        return 0.0;
    }
    let days = (remaining_ms as f64 / MILLIS_PER_DAY as f64).ceil();
    days / DAYS_PER_YEAR
}

/// Reversal level of `strike`; `0` without both leg prices.
pub fn reversal(strike: f64, legs: Option<LegPrices>, spot: f64, rate: f64, t: f64) -> f64 {
    let Some(LegPrices { put_ltp, call_ltp }) = legs else {
        return 0.0;
    };
    let carry = strike * (1.0 - (rate * t).exp());
    strike + (spot - strike + put_ltp - call_ltp + carry)
}

/// Support and resistance for every strike in `strikes`.
///
/// A strike mapped to `None` is missing a leg: it still gets a row, and any
/// level that references it is `0`. With `t <= 0` every level is `0`.
pub fn compute_ladder(
    strikes: &BTreeMap<Strike, Option<LegPrices>>,
    spot: f64,
    rate: f64,
    t: f64,
) -> BTreeMap<Strike, StrikeLevel> {
    if t <= 0.0 {
        return strikes
            .keys()
            .map(|&k| (k, StrikeLevel::new(0.0, 0.0)))
            .collect();
    }

    let chain: Vec<(f64, Option<LegPrices>)> =
        strikes.iter().map(|(k, legs)| (k.value(), *legs)).collect();
    let step = match chain.as_slice() {
        [(first, _), (second, _), ..] => second - first,
        _ => DEFAULT_STRIKE_STEP,
    };
    let level = |strike: f64, legs: Option<LegPrices>| reversal(strike, legs, spot, rate, t);

    chain
        .iter()
        .enumerate()
        .map(|(i, &(strike, legs))| {
            let support = if i == 0 {
                level(strike - step, legs)
            } else {
                level(strike, legs)
            };
            let resistance = match chain.get(i + 1) {
                Some(&(next, next_legs)) => level(next, next_legs),
                None => level(strike + step, legs),
            };
            (Strike(strike), StrikeLevel::new(support, resistance))
        })
        .collect()
}

impl OpeningSnapshot {
    /// Capture the opening snapshot of `chain`.
    ///
    /// `expiry` is the expiry the chain was fetched for; if it does not
    /// parse, the ladder is computed with `t = 0`.
    pub fn capture<Tz: TimeZone>(
        chain: &OptionChainData,
        expiry: &str,
        now: &DateTime<Tz>,
        rate: f64,
    ) -> Self {
        let legs: BTreeMap<Strike, Option<LegPrices>> = chain
            .oc
            .iter()
            .map(|(&strike, data)| {
                let prices = match (&data.pe, &data.ce) {
                    (Some(pe), Some(ce)) => Some(LegPrices {
                        put_ltp: pe.last_price,
                        call_ltp: ce.last_price,
                    }),
                    _ => None,
                };
                (strike, prices)
            })
            .collect();

        let t = parse_expiry(expiry).map_or(0.0, |e| year_fraction(e, now));
        let strike_levels = compute_ladder(&legs, chain.last_price, rate, t);

        Self {
            underlying_price: chain.last_price,
            strikes: legs
                .into_iter()
                .filter_map(|(k, prices)| prices.map(|p| (k, p)))
                .collect(),
            date: now
                .with_timezone(&market_offset())
                .format(DATE_FORMAT)
                .to_string(),
            strike_levels,
        }
    }
}
