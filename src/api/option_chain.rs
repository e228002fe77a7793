//! Option Chain endpoints: full chain data, expiry list.

use async_trait::async_trait;

use crate::client::DhanClient;
use crate::constants::{EXPIRY_LIST_PATH, OPTION_CHAIN_PATH};
use crate::error::Result;
use crate::gateway::OptionChainGateway;
use crate::types::instrument::Instrument;
use crate::types::option_chain::*;

impl DhanClient {
    /// Retrieve real-time Option Chain for a given underlying and expiry.
    ///
    /// Returns OI, Greeks, Volume, LTP, Best Bid/Ask and IV across all strikes.
    ///
    /// Rate limit: 1 unique request every 3 seconds.
    ///
    /// **Endpoint:** `POST /v2/optionchain`
    pub async fn get_option_chain(
        &self,
        req: &OptionChainRequest,
    ) -> Result<OptionChainResponse> {
        self.post(OPTION_CHAIN_PATH, req).await
    }

    /// Retrieve all active expiry dates for an underlying instrument.
    ///
    /// Rate limit: 1 unique request every 3 seconds.
    ///
    /// **Endpoint:** `POST /v2/optionchain/expirylist`
    pub async fn get_expiry_list(
        &self,
        req: &ExpiryListRequest,
    ) -> Result<ExpiryListResponse> {
        self.post(EXPIRY_LIST_PATH, req).await
    }
}

#[async_trait]
impl OptionChainGateway for DhanClient {
    async fn fetch_expiry_list(&self, instrument: &Instrument) -> Result<ExpiryListResponse> {
        let req = ExpiryListRequest {
            UnderlyingScrip: instrument.scrip_id,
            UnderlyingSeg: instrument.segment.to_string(),
        };
        self.get_expiry_list(&req).await
    }

    async fn fetch_option_chain(
        &self,
        instrument: &Instrument,
        expiry: &str,
    ) -> Result<OptionChainResponse> {
        let req = OptionChainRequest {
            UnderlyingScrip: instrument.scrip_id,
            UnderlyingSeg: instrument.segment.to_string(),
            Expiry: expiry.to_owned(),
        };
        self.get_option_chain(&req).await
    }
}
