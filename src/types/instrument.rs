//! Underlying instruments and the raw rows they are loaded from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DhanError, Result};
use crate::types::enums::ExchangeSegment;

/// An underlying whose option chain is polled. Identity is `(scrip_id, segment)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Security ID of the underlying.
    pub scrip_id: u64,
    /// Exchange & segment of the underlying.
    pub segment: ExchangeSegment,
}

impl Instrument {
    pub fn new(scrip_id: u64, segment: ExchangeSegment) -> Self {
        Self { scrip_id, segment }
    }

    /// The `{scrip}_{segment}` suffix shared by every cache key of this instrument.
    pub fn key_suffix(&self) -> String {
        format!("{}_{}", self.scrip_id, self.segment)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment, self.scrip_id)
    }
}

/// One row of the instrument universe as handed over by the loader,
/// before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRow {
    pub scrip_id: String,
    pub segment: String,
}

impl InstrumentRow {
    pub fn new(scrip_id: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            scrip_id: scrip_id.into(),
            segment: segment.into(),
        }
    }

    /// Parse a `scrip_id:segment` pair, e.g. `13:IDX_I`.
    pub fn parse_pair(s: &str) -> Result<Self> {
        let (scrip, segment) = s.split_once(':').ok_or_else(|| {
            DhanError::InvalidArgument(format!("expected scrip_id:segment, got {s:?}"))
        })?;
        Ok(Self::new(scrip.trim(), segment.trim()))
    }
}

impl TryFrom<&InstrumentRow> for Instrument {
    type Error = DhanError;

    fn try_from(row: &InstrumentRow) -> Result<Self> {
        let scrip_id = row.scrip_id.trim().parse::<u64>().map_err(|e| {
            DhanError::InvalidArgument(format!("bad scrip_id {:?}: {e}", row.scrip_id))
        })?;
        let segment = row.segment.parse()?;
        Ok(Self { scrip_id, segment })
    }
}
