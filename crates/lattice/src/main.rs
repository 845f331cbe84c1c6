mod cli;
mod persist;

use std::sync::Arc;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde::Serialize;

use lattice_core::account::ReceivableBlock;
use lattice_core::rpc::{HttpRpcClient, NanoRpc};
use lattice_core::sync::Synchronizer;
use lattice_core::types::{Address, Raw};
use lattice_core::{CoreError, StateStore};

use crate::cli::Command;
use crate::persist::StateFile;

#[derive(Serialize)]
struct ReceivableReport<'a> {
    account: &'a Address,
    total: &'a Raw,
    blocks: &'a [ReceivableBlock],
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let settings = args.settings();
    let client = HttpRpcClient::from_settings(&settings, args.requests_per_second)
        .wrap_err("configure node endpoints")?;
    tracing::info!(
        rpc_endpoints = client.rpc_endpoints().len(),
        work_endpoints = client.work_endpoints().len(),
        "node client ready"
    );
    let rpc: Arc<dyn NanoRpc> = Arc::new(client);

    // Seed the snapshot from disk and persist every commit back to it.
    let state_file = args.state_file.as_ref().map(|path| Arc::new(StateFile::new(path)));
    let initial = match &state_file {
        Some(file) => {
            let loaded = file.load().await?;
            if loaded.is_some() {
                tracing::info!(path = %file.path().display(), "loaded persisted account state");
            }
            loaded
        }
        None => None,
    };
    let state = Arc::new(StateStore::new(initial.unwrap_or_default()));
    if let Some(file) = &state_file {
        state.subscribe(file).await;
    }

    let address = args.address().clone();
    let synchronizer = Synchronizer::new(
        address.clone(),
        rpc,
        state.clone(),
        Arc::new(StateStore::new(settings.clone())),
    );

    match &args.command {
        Command::Sync(_) => {
            let snapshot = synchronizer
                .sync()
                .await
                .map_err(|err| rpc_failure(&settings.rpc_endpoints, &err))
                .wrap_err_with(|| format!("sync account {address}"))?;
            print_json(snapshot.as_ref())?;
        }
        Command::Receivable(_) => {
            let receivable = synchronizer
                .receivable()
                .await
                .map_err(|err| rpc_failure(&settings.rpc_endpoints, &err))
                .wrap_err_with(|| format!("fetch receivable blocks for {address}"))?;
            print_json(&ReceivableReport {
                account: &address,
                total: &receivable.total,
                blocks: &receivable.blocks,
            })?;
        }
    }

    Ok(())
}

fn print_json(value: &impl Serialize) -> eyre::Result<()> {
    let json = serde_json::to_string_pretty(value).wrap_err("encode output")?;
    println!("{json}");
    Ok(())
}

fn rpc_failure(endpoints: &[String], err: &CoreError) -> eyre::Report {
    eyre!(format_rpc_error(endpoints, &err.to_string()))
}

fn format_rpc_error(endpoints: &[String], source_error: &str) -> String {
    let mut lines = vec![
        format!("request failed against {}", endpoints.join(", ")),
        format!("error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("Could not resolve host") {
        lines.push(
            "hint: hostname resolution failed; verify the endpoint hostnames and your network"
                .into(),
        );
    } else if source_error.contains("timed out") {
        lines.push("hint: no endpoint answered in time; raise --timeout-secs or add endpoints".into());
    } else if source_error.contains("HTTP status 429") {
        lines.push("hint: the node is rate limiting; set --requests-per-second".into());
    } else if source_error.contains("HTTP status 401") || source_error.contains("HTTP status 403") {
        lines.push("hint: authentication failed; verify any API key embedded in the URL".into());
    } else if source_error.contains("node error") {
        lines.push("hint: the node rejected the request; check the account address".into());
    }

    lines.join("\n")
}
