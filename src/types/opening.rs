//! Opening snapshot types: the once-per-day capture the reversal ladder is
//! built from.
//!
//! Stored under `nine_thirty_data:{scrip}_{segment}` as
//!
//! ```json
//! {
//!   "s": 24850.5,
//!   "strikes": { "24800.000000": { "p": 61.2, "c": 112.4 } },
//!   "date": "2026-10-16",
//!   "strikeLevels": { "24800.000000": { "support": "24790.1234", "resistance": "24841.0021" } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::option_chain::Strike;

/// Put and call last traded prices at one strike at the open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegPrices {
    /// Put LTP.
    #[serde(rename = "p")]
    pub put_ltp: f64,
    /// Call LTP.
    #[serde(rename = "c")]
    pub call_ltp: f64,
}

/// Support and resistance at one strike, as fixed four-decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeLevel {
    pub support: String,
    pub resistance: String,
}

impl StrikeLevel {
    pub fn new(support: f64, resistance: f64) -> Self {
        Self {
            support: format!("{support:.4}"),
            resistance: format!("{resistance:.4}"),
        }
    }
}

/// The day's opening capture for one underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningSnapshot {
    /// Underlying price at the open.
    #[serde(rename = "s")]
    pub underlying_price: f64,
    /// Leg prices per strike. Strikes missing either leg are left out.
    pub strikes: BTreeMap<Strike, LegPrices>,
    /// Trading date of the capture (`YYYY-MM-DD`, market-local).
    pub date: String,
    /// Support/resistance ladder per strike.
    #[serde(rename = "strikeLevels")]
    pub strike_levels: BTreeMap<Strike, StrikeLevel>,
}
