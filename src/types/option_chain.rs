#![allow(missing_docs)]
//! Option Chain types: chain data, greeks, expiry list.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DhanError;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Request body for fetching the option chain.
///
/// Used by `POST /v2/optionchain`.
///
/// Note: field names use PascalCase in the API.
#[derive(Debug, Clone, Serialize)]
#[allow(non_snake_case)]
pub struct OptionChainRequest {
    /// Security ID of the underlying instrument.
    pub UnderlyingScrip: u64,
    /// Exchange & segment of the underlying.
    pub UnderlyingSeg: String,
    /// Expiry date (YYYY-MM-DD).
    pub Expiry: String,
}

/// Request body for fetching the expiry list.
///
/// Used by `POST /v2/optionchain/expirylist`.
#[derive(Debug, Clone, Serialize)]
#[allow(non_snake_case)]
pub struct ExpiryListRequest {
    /// Security ID of the underlying instrument.
    pub UnderlyingScrip: u64,
    /// Exchange & segment of the underlying.
    pub UnderlyingSeg: String,
}

// ---------------------------------------------------------------------------
// Strike
// ---------------------------------------------------------------------------

/// A strike price.
///
/// On the wire strikes are map keys rendered with exactly six decimals
/// (`"25650.000000"`, `"19650.500000"`). Ordering is numeric, so a
/// `BTreeMap<Strike, _>` iterates strikes in ascending order and two keys
/// that parse to the same price collapse into one.
#[derive(Debug, Clone, Copy)]
pub struct Strike(pub f64);

impl Strike {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Strike {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Strike {}

impl PartialOrd for Strike {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Strike {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Strike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl FromStr for Strike {
    type Err = DhanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| DhanError::InvalidArgument(format!("bad strike {s:?}: {e}")))?;
        if !value.is_finite() {
            return Err(DhanError::InvalidArgument(format!("non-finite strike {s:?}")));
        }
        Ok(Self(value))
    }
}

impl From<f64> for Strike {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Serialize for Strike {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Strike {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Greeks
// ---------------------------------------------------------------------------

/// Option greeks for a single strike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub theta: f64,
    pub gamma: f64,
    pub vega: f64,
}

// ---------------------------------------------------------------------------
// Option Data (per CE/PE)
// ---------------------------------------------------------------------------

/// Data for a single call or put at a given strike.
///
/// Absent numeric fields read as zero through the accessor methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeks: Option<Greeks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub last_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oi: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_oi: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_volume: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_ask_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_ask_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bid_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bid_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
}

impl OptionData {
    pub fn previous_close(&self) -> f64 {
        self.previous_close_price.unwrap_or_default()
    }

    pub fn open_interest(&self) -> i64 {
        self.oi.unwrap_or_default()
    }

    pub fn previous_open_interest(&self) -> i64 {
        self.previous_oi.unwrap_or_default()
    }

    pub fn traded_volume(&self) -> i64 {
        self.volume.unwrap_or_default()
    }

    pub fn iv(&self) -> f64 {
        self.implied_volatility.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Strike Data
// ---------------------------------------------------------------------------

/// Call and Put data at a given strike price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrikeData {
    /// Call option data (may be absent if no CE at this strike).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ce: Option<OptionData>,
    /// Put option data (may be absent if no PE at this strike).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe: Option<OptionData>,
}

// ---------------------------------------------------------------------------
// Option Chain Response
// ---------------------------------------------------------------------------

/// Inner data envelope of the option chain response.
///
/// This is the snapshot the poller caches under `option_chain:{scrip}_{segment}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionChainData {
    /// LTP of the underlying.
    #[serde(default)]
    pub last_price: f64,
    /// Strike-wise option chain, ascending by strike.
    #[serde(default)]
    pub oc: BTreeMap<Strike, StrikeData>,
}

/// Response from `POST /v2/optionchain`.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainResponse {
    #[serde(default)]
    pub data: Option<OptionChainData>,
    #[serde(default)]
    pub status: String,
}

// ---------------------------------------------------------------------------
// Expiry List Response
// ---------------------------------------------------------------------------

/// Response from `POST /v2/optionchain/expirylist`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpiryListResponse {
    /// List of expiry dates (YYYY-MM-DD), nearest first.
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub status: String,
}
