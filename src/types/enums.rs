//! Shared enum types that map directly to DhanHQ API string values.
//!
//! Variant names use `SCREAMING_SNAKE_CASE` to match the JSON wire format
//! expected by the DhanHQ API, so we suppress the Rust naming convention lint.
#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DhanError;

// ---------------------------------------------------------------------------
// Exchange Segment
// ---------------------------------------------------------------------------

/// Exchange and segment identifier of an underlying.
///
/// The string form (`"IDX_I"`, `"NSE_FNO"`, ...) is what the option chain
/// endpoints expect as `UnderlyingSeg` and what the cache key grammar embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeSegment {
    /// Index value (segment code 0).
    IDX_I,
    /// NSE Equity Cash (segment code 1).
    NSE_EQ,
    /// NSE Futures & Options (segment code 2).
    NSE_FNO,
    /// NSE Currency (segment code 3).
    NSE_CURRENCY,
    /// BSE Equity Cash (segment code 4).
    BSE_EQ,
    /// MCX Commodity (segment code 5).
    MCX_COMM,
    /// BSE Currency (segment code 7).
    BSE_CURRENCY,
    /// BSE Futures & Options (segment code 8).
    BSE_FNO,
}

impl ExchangeSegment {
    /// Every segment, in segment-code order.
    pub const ALL: [ExchangeSegment; 8] = [
        Self::IDX_I,
        Self::NSE_EQ,
        Self::NSE_FNO,
        Self::NSE_CURRENCY,
        Self::BSE_EQ,
        Self::MCX_COMM,
        Self::BSE_CURRENCY,
        Self::BSE_FNO,
    ];

    /// The wire name of the segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IDX_I => "IDX_I",
            Self::NSE_EQ => "NSE_EQ",
            Self::NSE_FNO => "NSE_FNO",
            Self::NSE_CURRENCY => "NSE_CURRENCY",
            Self::BSE_EQ => "BSE_EQ",
            Self::MCX_COMM => "MCX_COMM",
            Self::BSE_CURRENCY => "BSE_CURRENCY",
            Self::BSE_FNO => "BSE_FNO",
        }
    }
}

impl fmt::Display for ExchangeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeSegment {
    type Err = DhanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|seg| seg.as_str() == s)
            .ok_or_else(|| DhanError::InvalidArgument(format!("unknown exchange segment {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// Option Type
// ---------------------------------------------------------------------------

/// Derivative option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    CALL,
    PUT,
}

impl OptionType {
    /// Intrinsic value of this side at `strike` given the underlying price.
    pub fn intrinsic(self, underlying: f64, strike: f64) -> f64 {
        match self {
            Self::CALL => (underlying - strike).max(0.0),
            Self::PUT => (strike - underlying).max(0.0),
        }
    }
}
