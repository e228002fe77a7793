//! The broker gateway seam.
//!
//! A gateway is one authenticated broker session exposing the two reads the
//! poller needs. [`DhanClient`](crate::client::DhanClient) is the production
//! implementation; tests substitute scripted gateways.
//!
//! Gateways return the raw response envelopes. The envelope helpers here
//! turn them into data or a uniform error: a non-`"success"` status becomes
//! [`DhanError::Upstream`], an empty expiry list [`DhanError::NoExpiries`].

use async_trait::async_trait;

use crate::constants::STATUS_SUCCESS;
use crate::error::{DhanError, Result};
use crate::types::instrument::Instrument;
use crate::types::option_chain::{ExpiryListResponse, OptionChainData, OptionChainResponse};

/// Read access to option chain data for one broker session.
#[async_trait]
pub trait OptionChainGateway: Send + Sync {
    /// Fetch the listed expiries of an underlying, nearest first.
    async fn fetch_expiry_list(&self, instrument: &Instrument) -> Result<ExpiryListResponse>;

    /// Fetch the option chain of an underlying for one expiry.
    async fn fetch_option_chain(
        &self,
        instrument: &Instrument,
        expiry: &str,
    ) -> Result<OptionChainResponse>;
}

impl ExpiryListResponse {
    /// The nearest expiry, i.e. the first listed one.
    ///
    /// Upstream ordering is trusted; the list is not sorted here.
    pub fn nearest(self, instrument: &Instrument) -> Result<String> {
        if self.status != STATUS_SUCCESS {
            return Err(DhanError::Upstream {
                status: self.status,
            });
        }
        self.data
            .into_iter()
            .next()
            .ok_or_else(|| DhanError::NoExpiries {
                scrip: instrument.scrip_id,
                segment: instrument.segment.to_string(),
            })
    }
}

impl OptionChainResponse {
    /// The chain snapshot, if the response reports success.
    pub fn into_snapshot(self) -> Result<OptionChainData> {
        if self.status != STATUS_SUCCESS {
            return Err(DhanError::Upstream {
                status: self.status,
            });
        }
        self.data.ok_or_else(|| DhanError::Upstream {
            status: format!("{} without data", self.status),
        })
    }
}
