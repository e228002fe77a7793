//! Worker pool supervision: row validation, credential rotation, bounded
//! concurrency and graceful shutdown.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedGateway, ist};
use dhan_oc_cache::cache::{CacheStore, MemoryStore};
use dhan_oc_cache::clock::FixedClock;
use dhan_oc_cache::config::PollerConfig;
use dhan_oc_cache::credentials::{Credential, CredentialPool, SessionPool};
use dhan_oc_cache::error::DhanError;
use dhan_oc_cache::gateway::OptionChainGateway;
use dhan_oc_cache::types::instrument::InstrumentRow;
use dhan_oc_cache::worker::{Supervisor, SupervisorReport, WorkerSettings};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

fn gateways(n: usize) -> Vec<Arc<ScriptedGateway>> {
    (0..n).map(|_| Arc::new(ScriptedGateway::healthy())).collect()
}

fn sessions(gateways: &[Arc<ScriptedGateway>]) -> SessionPool {
    SessionPool::new(
        gateways
            .iter()
            .map(|g| Arc::clone(g) as Arc<dyn OptionChainGateway>)
            .collect(),
    )
    .unwrap()
}

fn supervisor(sessions: SessionPool, store: Arc<dyn CacheStore>) -> Supervisor {
    Supervisor::new(
        sessions,
        store,
        Arc::new(FixedClock::new(ist(2026, 10, 16, 11, 0, 0))),
        WorkerSettings::default(),
    )
}

fn rows(pairs: &[(&str, &str)]) -> Vec<InstrumentRow> {
    pairs
        .iter()
        .map(|(scrip, segment)| InstrumentRow::new(*scrip, *segment))
        .collect()
}

/// Run the supervisor for `secs` of paused time, then shut it down.
async fn run_for(
    supervisor: Supervisor,
    rows: Vec<InstrumentRow>,
    secs: u64,
) -> dhan_oc_cache::Result<SupervisorReport> {
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { supervisor.run(&rows, cancel).await }
    });
    sleep(Duration::from_secs(secs)).await;
    cancel.cancel();
    handle.await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_credentials_assigned_round_robin() {
    let gws = gateways(3);
    let store = Arc::new(MemoryStore::new());
    let sup = supervisor(sessions(&gws), store.clone());
    let universe = rows(&[
        ("13", "IDX_I"),
        ("25", "IDX_I"),
        ("27", "IDX_I"),
        ("51", "IDX_I"),
        ("442", "IDX_I"),
    ]);

    let report = run_for(sup, universe, 1).await.unwrap();
    assert_eq!(
        report,
        SupervisorReport {
            launched: 5,
            skipped: 0
        }
    );

    let mut seen0 = gws[0].scrips_seen();
    seen0.sort();
    assert_eq!(seen0, vec![13, 51]);
    let mut seen1 = gws[1].scrips_seen();
    seen1.sort();
    assert_eq!(seen1, vec![25, 442]);
    assert_eq!(gws[2].scrips_seen(), vec![27]);

    assert_eq!(store.keys("option_chain:*").await.unwrap().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_rows_are_skipped() {
    let gws = gateways(2);
    let store = Arc::new(MemoryStore::new());
    let sup = supervisor(sessions(&gws), store.clone());
    let universe = rows(&[
        ("13", "IDX_I"),
        ("abc", "IDX_I"),
        ("25", "NOT_A_SEGMENT"),
        ("51", "IDX_I"),
    ]);

    let report = run_for(sup, universe, 1).await.unwrap();
    assert_eq!(
        report,
        SupervisorReport {
            launched: 2,
            skipped: 2
        }
    );

    // Skipped rows still consume their index: row 3 lands on session 1.
    assert_eq!(gws[0].scrips_seen(), vec![13]);
    assert_eq!(gws[1].scrips_seen(), vec![51]);
    assert_eq!(
        store.keys("option_chain:*").await.unwrap(),
        vec!["option_chain:13_IDX_I", "option_chain:51_IDX_I"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_configured_universe_with_malformed_row_still_launches() {
    let config = PollerConfig::from_lookup(|key: &str| {
        match key {
            "DHAN_CLIENT_ID" => Some("1000000001"),
            "DHAN_ACCESS_TOKENS" => Some("tok-a,tok-b"),
            "DHAN_INSTRUMENTS" => Some("13:IDX_I,25-IDX_I,51:IDX_I"),
            _ => None,
        }
        .map(str::to_owned)
    })
    .unwrap();

    let gws = gateways(config.credentials.len());
    let store = Arc::new(MemoryStore::new());
    let sup = supervisor(sessions(&gws), store.clone());

    let report = run_for(sup, config.instruments, 1).await.unwrap();
    assert_eq!(
        report,
        SupervisorReport {
            launched: 2,
            skipped: 1
        }
    );

    // Row 2 keeps its index and lands on session 0 again.
    let mut seen0 = gws[0].scrips_seen();
    seen0.sort();
    assert_eq!(seen0, vec![13, 51]);
    assert!(gws[1].scrips_seen().is_empty());
    assert_eq!(
        store.keys("option_chain:*").await.unwrap(),
        vec!["option_chain:13_IDX_I", "option_chain:51_IDX_I"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_valid_rows_is_a_config_error() {
    let gws = gateways(1);
    let sup = supervisor(sessions(&gws), Arc::new(MemoryStore::new()));

    let err = sup
        .run(&rows(&[("x", "IDX_I"), ("1", "")]), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DhanError::Config(_)), "got: {err:?}");

    let err = sup.run(&[], CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, DhanError::Config(_)), "got: {err:?}");
    assert_eq!(gws[0].expiry_calls(), 0);
}

#[test]
fn test_zero_credentials_is_a_config_error() {
    assert!(matches!(
        CredentialPool::new(Vec::new()),
        Err(DhanError::Config(_))
    ));
    assert!(matches!(
        SessionPool::new(Vec::new()),
        Err(DhanError::Config(_))
    ));
}

#[test]
fn test_more_instruments_than_credentials_reuses_them() {
    let pool = CredentialPool::new(vec![
        Credential::new("c1", "t1"),
        Credential::new("c2", "t2"),
    ])
    .unwrap();
    let assigned: Vec<&str> = (0..5).map(|i| pool.assign(i).client_id()).collect();
    assert_eq!(assigned, vec!["c1", "c2", "c1", "c2", "c1"]);
    assert!(!format!("{:?}", pool.assign(0)).contains("t1"));

    let mut opened = Vec::new();
    let sessions = pool
        .open_sessions(|c| {
            opened.push(c.client_id().to_owned());
            Ok(Arc::new(ScriptedGateway::healthy()) as Arc<dyn OptionChainGateway>)
        })
        .unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(opened, vec!["c1", "c2"]);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_bounded() {
    let gws = gateways(1);
    let sup = supervisor(sessions(&gws), Arc::new(MemoryStore::new())).with_max_concurrency(2);
    let universe = rows(&[
        ("13", "IDX_I"),
        ("25", "IDX_I"),
        ("27", "IDX_I"),
        ("51", "IDX_I"),
    ]);

    // Workers never finish on their own, so the two queued ones never start.
    let report = run_for(sup, universe, 10).await.unwrap();
    assert_eq!(report.launched, 4);
    assert_eq!(gws[0].scrips_seen().len(), 2);
    // Two workers, each polling at t = 0, 3, 6, 9.
    assert_eq!(gws[0].expiry_calls(), 8);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_leaves_cache_as_last_written() {
    let gws = gateways(1);
    let store = Arc::new(MemoryStore::new());
    let sup = supervisor(sessions(&gws), store.clone());

    run_for(sup, rows(&[("13", "IDX_I")]), 1).await.unwrap();
    let calls = gws[0].expiry_calls();

    sleep(Duration::from_secs(30)).await;
    assert_eq!(gws[0].expiry_calls(), calls, "no polling after shutdown");
    assert!(store.exists("option_chain:13_IDX_I").await.unwrap());
    assert_eq!(store.ttl("option_chain:13_IDX_I").await.unwrap(), Some(269));
}
