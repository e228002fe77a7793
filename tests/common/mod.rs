//! Test doubles shared by the worker, supervisor and query tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, TimeZone};
use dhan_oc_cache::cache::{CacheStore, MemoryStore};
use dhan_oc_cache::error::{DhanError, Result};
use dhan_oc_cache::gateway::OptionChainGateway;
use dhan_oc_cache::types::instrument::Instrument;
use dhan_oc_cache::types::option_chain::{
    ExpiryListResponse, OptionChainData, OptionChainResponse,
};

pub const EXPIRY: &str = "2026-10-20";

/// Exchange-local timestamp.
pub fn ist(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(19_800)
        .unwrap()
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .unwrap()
}

/// A three-strike chain around 24 850.
pub fn sample_chain() -> OptionChainData {
    serde_json::from_value(serde_json::json!({
        "last_price": 24_850.5,
        "oc": {
            "24800.000000": {
                "ce": {"last_price": 112.4, "previous_close_price": 100.0, "oi": 1000, "previous_oi": 900, "volume": 5000, "implied_volatility": 12.5},
                "pe": {"last_price": 61.2, "previous_close_price": 70.0, "oi": 900, "previous_oi": 950, "volume": 4000, "implied_volatility": 13.1}
            },
            "24850.000000": {
                "ce": {"last_price": 84.0, "oi": 700, "volume": 3000},
                "pe": {"last_price": 82.5, "oi": 650, "volume": 2500}
            },
            "24900.000000": {
                "ce": {"last_price": 55.0, "oi": 1200, "volume": 6000},
                "pe": {"last_price": 104.6, "oi": 400, "volume": 1500}
            }
        }
    }))
    .unwrap()
}

/// How one polling iteration should go.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    /// The expiry list is empty.
    NoExpiries,
    /// The expiry list call fails at the transport level.
    Transport,
    /// The chain call answers with this business status.
    ChainStatus(&'static str),
}

/// A gateway that plays back one [`Step`] per iteration, then succeeds.
pub struct ScriptedGateway {
    chain: OptionChainData,
    steps: Mutex<VecDeque<Step>>,
    pending_chain_status: Mutex<Option<&'static str>>,
    expiry_calls: AtomicUsize,
    chain_calls: AtomicUsize,
    seen: Mutex<Vec<Instrument>>,
}

impl ScriptedGateway {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            chain: sample_chain(),
            steps: Mutex::new(steps.into_iter().collect()),
            pending_chain_status: Mutex::new(None),
            expiry_calls: AtomicUsize::new(0),
            chain_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn healthy() -> Self {
        Self::new([])
    }

    pub fn expiry_calls(&self) -> usize {
        self.expiry_calls.load(Ordering::SeqCst)
    }

    pub fn chain_calls(&self) -> usize {
        self.chain_calls.load(Ordering::SeqCst)
    }

    /// Distinct scrip IDs this gateway was asked about, in first-seen order.
    pub fn scrips_seen(&self) -> Vec<u64> {
        let mut scrips: Vec<u64> = Vec::new();
        for instrument in self.seen.lock().unwrap().iter() {
            if !scrips.contains(&instrument.scrip_id) {
                scrips.push(instrument.scrip_id);
            }
        }
        scrips
    }
}

#[async_trait]
impl OptionChainGateway for ScriptedGateway {
    async fn fetch_expiry_list(&self, instrument: &Instrument) -> Result<ExpiryListResponse> {
        self.expiry_calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(*instrument);

        let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Succeed);
        let data = match step {
            Step::Succeed => vec![EXPIRY.to_owned(), "2026-10-27".to_owned()],
            Step::NoExpiries => Vec::new(),
            Step::Transport => {
                return Err(DhanError::HttpStatus {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    body: "upstream unavailable".into(),
                });
            }
            Step::ChainStatus(status) => {
                *self.pending_chain_status.lock().unwrap() = Some(status);
                vec![EXPIRY.to_owned()]
            }
        };
        Ok(ExpiryListResponse {
            data,
            status: "success".into(),
        })
    }

    async fn fetch_option_chain(
        &self,
        _instrument: &Instrument,
        expiry: &str,
    ) -> Result<OptionChainResponse> {
        self.chain_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(expiry, EXPIRY, "chain must be fetched for the nearest expiry");

        if let Some(status) = self.pending_chain_status.lock().unwrap().take() {
            return Ok(OptionChainResponse {
                data: None,
                status: status.into(),
            });
        }
        Ok(OptionChainResponse {
            data: Some(self.chain.clone()),
            status: "success".into(),
        })
    }
}

/// A [`MemoryStore`] that records the key of every write, in order.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<()> {
        self.writes.lock().unwrap().push(key.to_owned());
        self.inner.set(key, value, ttl_secs).await
    }

    async fn set_if_absent(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<bool> {
        let written = self.inner.set_if_absent(key, value, ttl_secs).await?;
        if written {
            self.writes.lock().unwrap().push(key.to_owned());
        }
        Ok(written)
    }

    async fn ttl(&self, key: &str) -> Result<Option<i64>> {
        self.inner.ttl(key).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.inner.keys(pattern).await
    }
}
