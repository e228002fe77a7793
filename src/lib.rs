//! # dhan-oc-cache
//!
//! A background option-chain poller for the
//! [DhanHQ Broker API v2](https://dhanhq.co/docs/v2/).
//!
//! A [`Supervisor`](worker::Supervisor) runs one [`Worker`](worker::Worker)
//! per underlying. Each worker polls the nearest expiry and its option chain
//! through one of several broker sessions, caches both under short TTLs and,
//! once per trading day inside the 09:30 window, records an opening snapshot
//! with a reversal support/resistance ladder. The read side
//! ([`QueryService`](query::QueryService)) turns cached chains into
//! per-strike analytics.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dhan_oc_cache::cache::MemoryStore;
//! use dhan_oc_cache::clock::SystemClock;
//! use dhan_oc_cache::credentials::{Credential, CredentialPool};
//! use dhan_oc_cache::gateway::OptionChainGateway;
//! use dhan_oc_cache::types::instrument::InstrumentRow;
//! use dhan_oc_cache::worker::{Supervisor, WorkerSettings};
//! use dhan_oc_cache::DhanClient;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> dhan_oc_cache::Result<()> {
//!     let pool = CredentialPool::new(vec![Credential::new("your-client-id", "your-access-token")])?;
//!     let sessions = pool.open_sessions(|c| {
//!         let client = DhanClient::for_credential(c, dhan_oc_cache::constants::API_BASE_URL)?;
//!         Ok(Arc::new(client) as Arc<dyn OptionChainGateway>)
//!     })?;
//!
//!     let supervisor = Supervisor::new(
//!         sessions,
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(SystemClock::default()),
//!         WorkerSettings::default(),
//!     );
//!     let rows = vec![InstrumentRow::new("13", "IDX_I")];
//!     supervisor.run(&rows, CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod ladder;
pub mod query;
pub mod types;
pub mod worker;

/// Re-export the broker client at crate root for convenience.
pub use client::DhanClient;
/// Re-export the error type and Result alias.
pub use error::{DhanError, Result};
