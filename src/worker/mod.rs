//! The polling worker: one long-lived loop per underlying.
//!
//! Each iteration fetches the nearest expiry and its option chain through
//! the worker's gateway session, writes both to the cache (expiry first),
//! and records the day's opening snapshot when the opening window is open
//! and no snapshot exists yet. A successful iteration is followed by the
//! rate-limit delay, a failed one by the backoff delay. Failures never end
//! the loop; only the cancellation token does, and only at a wait.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dhan_oc_cache::cache::MemoryStore;
//! use dhan_oc_cache::clock::SystemClock;
//! use dhan_oc_cache::types::{ExchangeSegment, instrument::Instrument};
//! use dhan_oc_cache::worker::{Worker, WorkerSettings};
//! use dhan_oc_cache::DhanClient;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> dhan_oc_cache::Result<()> {
//! let worker = Worker::new(
//!     Instrument::new(13, ExchangeSegment::IDX_I),
//!     Arc::new(DhanClient::new("client-id", "access-token")?),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SystemClock::default()),
//!     WorkerSettings::default(),
//! );
//! worker.run(CancellationToken::new()).await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{self, CacheStore};
use crate::clock::Clock;
use crate::constants::{
    BACKOFF_DELAY, DEFAULT_RISK_FREE_RATE, EXPIRY_DATE_TTL_SECS, OPENING_TTL_SECS,
    OPTION_CHAIN_TTL_SECS, RATE_LIMIT_DELAY,
};
use crate::error::Result;
use crate::gate::{HolidayCalendar, is_opening_window};
use crate::gateway::OptionChainGateway;
use crate::types::instrument::Instrument;
use crate::types::opening::OpeningSnapshot;
use crate::types::option_chain::OptionChainData;

pub mod supervisor;

pub use supervisor::{Supervisor, SupervisorReport};

/// Timing and calendar parameters shared by every worker.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Wait after a successful iteration.
    pub rate_limit_delay: Duration,
    /// Wait after a failed iteration.
    pub backoff_delay: Duration,
    /// Rate used by the reversal ladder.
    pub risk_free_rate: f64,
    /// Exchange holidays, on which no opening snapshot is taken.
    pub holidays: Arc<HolidayCalendar>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            rate_limit_delay: RATE_LIMIT_DELAY,
            backoff_delay: BACKOFF_DELAY,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            holidays: Arc::new(HolidayCalendar::default()),
        }
    }
}

/// Where a worker's loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// About to run an iteration.
    Polling,
    /// The last iteration failed; wait out the backoff delay.
    Backoff,
    /// Cancelled; the loop exits.
    ShuttingDown,
}

/// What one successful iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// The expiry that was polled and cached.
    pub expiry: String,
    /// Number of strikes in the cached chain.
    pub strikes: usize,
    /// Whether this iteration wrote the opening snapshot.
    pub opening_recorded: bool,
}

/// Iteration counts of a finished [`Worker::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub succeeded: u64,
    pub failed: u64,
}

/// Polls one underlying through one gateway session.
pub struct Worker {
    instrument: Instrument,
    gateway: Arc<dyn OptionChainGateway>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    settings: WorkerSettings,
}

impl Worker {
    pub fn new(
        instrument: Instrument,
        gateway: Arc<dyn OptionChainGateway>,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            instrument,
            gateway,
            store,
            clock,
            settings,
        }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Poll until `cancel` fires.
    ///
    /// Cancellation is observed only between iterations, so an iteration
    /// in flight always completes and leaves the cache consistent.
    pub async fn run(&self, cancel: CancellationToken) -> WorkerSummary {
        let scrip = self.instrument.scrip_id;
        let segment = self.instrument.segment;
        info!(scrip, %segment, "worker starting");

        let mut summary = WorkerSummary::default();
        let mut state = WorkerState::Polling;
        loop {
            state = match state {
                WorkerState::Polling if cancel.is_cancelled() => WorkerState::ShuttingDown,
                WorkerState::Polling => match self.poll_once().await {
                    Ok(outcome) => {
                        summary.succeeded += 1;
                        info!(
                            scrip,
                            %segment,
                            expiry = %outcome.expiry,
                            strikes = outcome.strikes,
                            "fetched option chain"
                        );
                        self.wait(self.settings.rate_limit_delay, &cancel).await
                    }
                    Err(e) => {
                        summary.failed += 1;
                        warn!(scrip, %segment, error = %e, "poll failed, backing off");
                        WorkerState::Backoff
                    }
                },
                WorkerState::Backoff => self.wait(self.settings.backoff_delay, &cancel).await,
                WorkerState::ShuttingDown => break,
            };
        }

        info!(
            scrip,
            %segment,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "worker exiting"
        );
        summary
    }

    async fn wait(&self, delay: Duration, cancel: &CancellationToken) -> WorkerState {
        tokio::select! {
            _ = cancel.cancelled() => WorkerState::ShuttingDown,
            _ = sleep(delay) => WorkerState::Polling,
        }
    }

    /// Run a single iteration: fetch, persist, and maybe record the opening.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let expiry = self
            .gateway
            .fetch_expiry_list(&self.instrument)
            .await?
            .nearest(&self.instrument)?;
        let chain = self
            .gateway
            .fetch_option_chain(&self.instrument, &expiry)
            .await?
            .into_snapshot()?;

        // The expiry is always written before the chain it belongs to.
        let expiry_key = cache::expiry_date_key(&self.instrument);
        self.store
            .set(&expiry_key, Bytes::from(expiry.clone()), EXPIRY_DATE_TTL_SECS)
            .await?;

        let chain_key = cache::option_chain_key(&self.instrument);
        let payload = serde_json::to_vec(&chain)?;
        self.store
            .set(&chain_key, Bytes::from(payload), OPTION_CHAIN_TTL_SECS)
            .await?;
        debug!(key = %chain_key, "cached option chain");
        self.verify_write(&chain_key).await;

        let opening_recorded = self.record_opening_if_due(&chain, &expiry).await?;

        Ok(PollOutcome {
            expiry,
            strikes: chain.oc.len(),
            opening_recorded,
        })
    }

    /// Read `key` back and log what the store holds.
    async fn verify_write(&self, key: &str) {
        let stored = match self.store.get(key).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(%key, error = %e, "cache read-back failed");
                return;
            }
        };
        let bytes = stored.as_ref().map_or(0, Bytes::len);
        match self.store.ttl(key).await {
            Ok(ttl) => debug!(%key, bytes, ?ttl, "cache write verified"),
            Err(e) => warn!(%key, bytes, error = %e, "cache TTL lookup failed"),
        }
    }

    /// Record the opening snapshot of `chain` if the window is open and
    /// today's snapshot is not cached yet. Returns whether this call wrote it.
    ///
    /// The existence check skips the computation in the common case; the
    /// final write is a set-if-absent, so concurrent callers write at most
    /// once per key lifetime.
    pub async fn record_opening_if_due(
        &self,
        chain: &OptionChainData,
        expiry: &str,
    ) -> Result<bool> {
        let now = self.clock.now();
        if !is_opening_window(&now, &self.settings.holidays) {
            return Ok(false);
        }

        let key = cache::opening_key(&self.instrument);
        if self.store.exists(&key).await? {
            return Ok(false);
        }

        let snapshot = OpeningSnapshot::capture(chain, expiry, &now, self.settings.risk_free_rate);
        let payload = serde_json::to_vec(&snapshot)?;
        let written = self
            .store
            .set_if_absent(&key, Bytes::from(payload), OPENING_TTL_SECS)
            .await?;

        if written {
            info!(%key, date = %snapshot.date, strikes = snapshot.strike_levels.len(), "recorded opening snapshot");
        } else {
            debug!(%key, "opening snapshot already recorded");
        }
        Ok(written)
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("instrument", &self.instrument)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
