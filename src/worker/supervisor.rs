//! Launches one worker per instrument row behind a bounded pool.
//!
//! Row `i` gets gateway session `i % sessions`. Rows that do not parse are
//! skipped with a warning and still consume their index. At most
//! `max_concurrency` workers run at once; the rest wait for a slot, and
//! since workers only stop on shutdown a queued worker starts only when a
//! running one has exited.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::constants::DEFAULT_MAX_CONCURRENT_WORKERS;
use crate::credentials::SessionPool;
use crate::error::{DhanError, Result};
use crate::types::instrument::{Instrument, InstrumentRow};
use crate::worker::{Worker, WorkerSettings};

/// Summary of a supervisor run, returned once every worker has drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    /// Workers launched, one per valid row.
    pub launched: usize,
    /// Malformed rows that were skipped.
    pub skipped: usize,
}

/// Owns the worker pool.
pub struct Supervisor {
    sessions: SessionPool,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    settings: WorkerSettings,
    max_concurrency: usize,
}

impl Supervisor {
    pub fn new(
        sessions: SessionPool,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            sessions,
            store,
            clock,
            settings,
            max_concurrency: DEFAULT_MAX_CONCURRENT_WORKERS,
        }
    }

    /// Cap on concurrently running workers (at least 1).
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Validate `rows`, launch their workers and wait for all of them to
    /// exit after `cancel` fires.
    ///
    /// Fails with [`DhanError::Config`] before launching anything if no
    /// row is valid.
    pub async fn run(
        &self,
        rows: &[InstrumentRow],
        cancel: CancellationToken,
    ) -> Result<SupervisorReport> {
        let mut instruments = Vec::with_capacity(rows.len());
        let mut skipped = 0;
        for (index, row) in rows.iter().enumerate() {
            match Instrument::try_from(row) {
                Ok(instrument) => instruments.push((index, instrument)),
                Err(e) => {
                    skipped += 1;
                    warn!(index, scrip = %row.scrip_id, segment = %row.segment, error = %e, "skipping invalid instrument row");
                }
            }
        }
        if instruments.is_empty() {
            return Err(DhanError::Config(format!(
                "no valid instrument rows ({skipped} skipped)"
            )));
        }

        let slots = Arc::new(Semaphore::new(self.max_concurrency));
        let mut workers = JoinSet::new();
        for (index, instrument) in instruments {
            let worker = Worker::new(
                instrument,
                self.sessions.assign(index),
                Arc::clone(&self.store),
                Arc::clone(&self.clock),
                self.settings.clone(),
            );
            let slots = Arc::clone(&slots);
            let cancel = cancel.clone();
            workers.spawn(async move {
                let permit = tokio::select! {
                    _ = cancel.cancelled() => return,
                    permit = slots.acquire_owned() => permit,
                };
                let Ok(_permit) = permit else {
                    return;
                };
                worker.run(cancel).await;
            });
        }

        let report = SupervisorReport {
            launched: workers.len(),
            skipped,
        };
        info!(
            launched = report.launched,
            skipped = report.skipped,
            sessions = self.sessions.len(),
            max_concurrency = self.max_concurrency,
            "supervisor started"
        );

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "worker task failed");
            }
        }
        info!("all workers stopped");
        Ok(report)
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("sessions", &self.sessions)
            .field("settings", &self.settings)
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}
