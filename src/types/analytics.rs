#![allow(missing_docs)]
//! Derived option chain analytics: per-strike rows and chain totals.
//!
//! These are computed on read from a cached snapshot and never persisted.
//! Ratios, percentages, IV and time value are rounded to two decimals;
//! open interest and volume counts are carried as-is.

use serde::{Deserialize, Serialize};

/// One strike of the analytics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    pub strike: f64,
    pub pcr_oi: f64,
    pub pcr_vol: f64,
    pub call_iv: f64,
    /// Call time value; negative values are kept.
    pub call_tv: f64,
    pub call_oi_chg: i64,
    pub call_oi: i64,
    pub call_vol: i64,
    pub call_chg_pct: f64,
    pub call_ltp: f64,
    pub put_ltp: f64,
    pub put_chg_pct: f64,
    pub put_vol: i64,
    pub put_oi: i64,
    pub put_oi_chg: i64,
    /// Put time value; negative values are kept.
    pub put_tv: f64,
    pub put_iv: f64,
}

/// Chain-wide aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainTotals {
    pub total_pcr_oi: f64,
    pub total_pcr_vol: f64,
    pub total_call_oi: i64,
    pub total_call_vol: i64,
    pub total_put_oi: i64,
    pub total_put_vol: i64,
    pub total_call_oi_chg: i64,
    pub total_put_oi_chg: i64,
}

/// The full analytics view of one option chain snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsTable {
    pub underlying_price: f64,
    /// Strike nearest to the underlying, lowest on ties. `None` for an empty chain.
    pub atm_strike: Option<f64>,
    /// Rows in ascending strike order.
    pub chain: Vec<AnalyticsRow>,
    pub totals: ChainTotals,
}
