use std::env;
use std::sync::{Arc, Once};

use lattice_core::rpc::{HttpRpcClient, NanoRpc};
use lattice_core::state::StateStore;
use lattice_core::sync::Synchronizer;
use lattice_core::types::{Address, WorkThreshold};
use lattice_core::{AccountState, WalletSettings};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lattice_core=debug")),
            )
            .with_target(true)
            .try_init();
    });
}

fn live_settings() -> (WalletSettings, Address) {
    let rpc_url = env::var("LATTICE_TEST_RPC_URL").expect("LATTICE_TEST_RPC_URL must be set");
    let account: Address = env::var("LATTICE_TEST_ACCOUNT")
        .expect("LATTICE_TEST_ACCOUNT must be set")
        .parse()
        .expect("LATTICE_TEST_ACCOUNT must be a non-empty address");

    // Port 9 (discard) never answers JSON, so every call exercises failover.
    let settings = WalletSettings {
        rpc_endpoints: vec!["http://127.0.0.1:9".to_owned(), rpc_url.clone()],
        work_endpoints: vec![rpc_url],
        ..Default::default()
    };
    (settings, account)
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a reachable node; set LATTICE_TEST_RPC_URL and LATTICE_TEST_ACCOUNT"]
async fn live_node_answers_account_and_receivable_queries() {
    init_tracing();
    let (settings, account) = live_settings();

    let rpc = HttpRpcClient::from_settings(&settings, None).expect("rpc client must construct");
    assert_eq!(rpc.rpc_endpoints().len(), 2);

    eprintln!("[itest] fetching account_info for {account}");
    let info = match rpc.account_info(&account).await {
        Ok(info) => info,
        Err(err) => {
            assert_eq!(
                err.node_message(),
                Some("Account not found"),
                "only an unopened account may fail account_info: {err}"
            );
            eprintln!("[itest] account is not opened");
            return;
        }
    };
    assert!(info.frontier.is_some(), "opened account must report a frontier");

    eprintln!("[itest] fetching receivable blocks");
    let blocks = rpc
        .receivable(&account, 10, &settings.min_receivable)
        .await
        .expect("receivable must succeed");
    assert!(blocks.len() <= 10, "node must honor the count limit");
    for block in &blocks {
        assert!(
            block.amount >= settings.min_receivable,
            "node must honor the amount threshold"
        );
    }
    eprintln!("[itest] live rpc checks completed");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a reachable node; set LATTICE_TEST_RPC_URL and LATTICE_TEST_ACCOUNT"]
async fn live_synchronizer_commits_a_consistent_snapshot() {
    init_tracing();
    let (settings, account) = live_settings();

    let rpc = Arc::new(HttpRpcClient::from_settings(&settings, None).expect("rpc client must construct"));
    let state = Arc::new(StateStore::new(AccountState::default()));
    let synchronizer = Synchronizer::new(
        account,
        rpc,
        state.clone(),
        Arc::new(StateStore::new(settings)),
    );

    let snapshot = synchronizer.sync().await.expect("sync must succeed");
    let total = snapshot
        .receivable
        .iter()
        .fold(lattice_core::types::Raw::zero(), |acc, block| {
            acc.checked_add(&block.amount)
        });
    assert_eq!(snapshot.receivable_total, total);
    assert_eq!(*state.get().await, *snapshot);
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a work-capable node; set LATTICE_TEST_RPC_URL and LATTICE_TEST_ACCOUNT"]
async fn live_work_server_returns_a_solution() {
    init_tracing();
    let (settings, _) = live_settings();

    let rpc = HttpRpcClient::from_settings(&settings, None).expect("rpc client must construct");
    let hash = "991CF190094C00F0B68E2E5F75F6BEE95A2E0BD93CEAA4A6734DB9F19B728948"
        .parse()
        .expect("fixture hash must parse");

    let generated = rpc
        .work_generate(&hash, WorkThreshold(0xfffffe0000000000))
        .await
        .expect("work_generate must succeed");
    let work = generated.work.expect("work server must return work");
    assert_eq!(work.as_str().len(), 16, "work must be 8 bytes of hex");
}
