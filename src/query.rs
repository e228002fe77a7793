//! Read side of the cache, consumed by the HTTP layer.
//!
//! Every lookup distinguishes a key that was never written or has expired
//! ([`Lookup::NotFound`]) from one whose value cannot be decoded
//! ([`Lookup::Corrupted`]). Store failures are still errors.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::analytics::derive_analytics;
use crate::cache::{self, CacheStore};
use crate::constants::{EXPIRY_DATE_PREFIX, OPENING_PREFIX, OPTION_CHAIN_PREFIX};
use crate::error::Result;
use crate::types::analytics::AnalyticsTable;
use crate::types::instrument::Instrument;
use crate::types::opening::OpeningSnapshot;
use crate::types::option_chain::OptionChainData;

/// Result of reading one cached entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    /// Never polled, or expired.
    NotFound,
    /// Present but undecodable.
    Corrupted { key: String, reason: String },
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
            Self::Corrupted { key, reason } => Lookup::Corrupted { key, reason },
        }
    }
}

/// Key counts per prefix plus one sample entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub option_chain_count: usize,
    pub expiry_count: usize,
    pub opening_count: usize,
    /// The first `option_chain:*` key and its raw value, lossily decoded.
    pub sample: Option<(String, String)>,
}

/// Typed reads over a [`CacheStore`].
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn CacheStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// The analytics table of the cached chain.
    pub async fn get_option_chain(&self, instrument: &Instrument) -> Result<Lookup<AnalyticsTable>> {
        let key = cache::option_chain_key(instrument);
        let chain: Lookup<OptionChainData> = self.read_json(&key).await?;
        Ok(chain.map(|chain| derive_analytics(&chain)))
    }

    /// The cached nearest expiry.
    pub async fn get_expiry(&self, instrument: &Instrument) -> Result<Lookup<String>> {
        let key = cache::expiry_date_key(instrument);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(Lookup::NotFound);
        };
        Ok(match String::from_utf8(raw.to_vec()) {
            Ok(expiry) => Lookup::Found(expiry),
            Err(e) => Lookup::Corrupted {
                key,
                reason: e.to_string(),
            },
        })
    }

    /// Today's opening snapshot with its ladder.
    pub async fn get_opening_ladder(
        &self,
        instrument: &Instrument,
    ) -> Result<Lookup<OpeningSnapshot>> {
        self.read_json(&cache::opening_key(instrument)).await
    }

    /// Count the cached keys of each kind.
    pub async fn cache_status(&self) -> Result<CacheStatus> {
        let chains = format!("{OPTION_CHAIN_PREFIX}:*");
        let expiries = format!("{EXPIRY_DATE_PREFIX}:*");
        let openings = format!("{OPENING_PREFIX}:*");
        let (chain_keys, expiry_keys, opening_keys) = futures_util::try_join!(
            self.store.keys(&chains),
            self.store.keys(&expiries),
            self.store.keys(&openings),
        )?;

        let sample = match chain_keys.first() {
            Some(key) => self
                .store
                .get(key)
                .await?
                .map(|value| (key.clone(), String::from_utf8_lossy(&value).into_owned())),
            None => None,
        };

        Ok(CacheStatus {
            option_chain_count: chain_keys.len(),
            expiry_count: expiry_keys.len(),
            opening_count: opening_keys.len(),
            sample,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Lookup<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(Lookup::NotFound);
        };
        Ok(decode(key, &raw))
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &Bytes) -> Lookup<T> {
    match serde_json::from_slice(raw) {
        Ok(value) => Lookup::Found(value),
        Err(e) => Lookup::Corrupted {
            key: key.to_owned(),
            reason: e.to_string(),
        },
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService").finish_non_exhaustive()
    }
}
