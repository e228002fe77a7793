//! Background worker: polls the option chains of the configured underlyings
//! into Redis until interrupted.
//!
//! # Usage
//!
//! ```sh
//! export DHAN_CLIENT_ID="your-client-id"
//! export DHAN_ACCESS_TOKENS="token-1,token-2"
//! export DHAN_INSTRUMENTS="13:IDX_I,25:IDX_I,51:IDX_I"
//! export REDIS_URL="redis://localhost:6379/0"
//! cargo run --bin oc_worker --features cli
//! ```
//!
//! See [`dhan_oc_cache::config`] for every variable.

use std::sync::Arc;

use dhan_oc_cache::DhanClient;
use dhan_oc_cache::cache::RedisStore;
use dhan_oc_cache::clock::SystemClock;
use dhan_oc_cache::config::PollerConfig;
use dhan_oc_cache::gateway::OptionChainGateway;
use dhan_oc_cache::worker::{Supervisor, WorkerSettings};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> dhan_oc_cache::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "oc_worker failed");
        return Err(e);
    }
    Ok(())
}

async fn run() -> dhan_oc_cache::error::Result<()> {
    let config = PollerConfig::from_env()?;

    let store = RedisStore::connect(&config.redis.url()).await?;
    let sessions = config.credentials.open_sessions(|credential| {
        let client = DhanClient::for_credential(credential, &config.base_url)?;
        Ok(Arc::new(client) as Arc<dyn OptionChainGateway>)
    })?;
    tracing::info!(
        sessions = sessions.len(),
        instruments = config.instruments.len(),
        "starting option chain poller"
    );

    let settings = WorkerSettings {
        risk_free_rate: config.risk_free_rate,
        holidays: Arc::new(config.holidays.clone()),
        ..WorkerSettings::default()
    };
    let supervisor = Supervisor::new(
        sessions,
        Arc::new(store),
        Arc::new(SystemClock::default()),
        settings,
    )
    .with_max_concurrency(config.max_concurrent_workers.min(config.instruments.len()));

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl-C received, stopping workers after their current iteration");
                shutdown.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    let report = supervisor.run(&config.instruments, cancel).await?;
    tracing::info!(
        launched = report.launched,
        skipped = report.skipped,
        "poller stopped"
    );
    Ok(())
}
