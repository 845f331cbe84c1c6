use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use lattice_core::settings::{DEFAULT_MIN_RECEIVABLE, DEFAULT_RECEIVABLE_COUNT};
use lattice_core::types::{Address, Raw};
use lattice_core::WalletSettings;

/// Lattice: keep a local mirror of a block-lattice account in sync with
/// remote nodes.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Node RPC URL (repeatable or comma separated; tried in order).
    #[arg(
        long = "rpc-url",
        env = "LATTICE_RPC_URL",
        value_delimiter = ',',
        required = true
    )]
    pub rpc_urls: Vec<String>,

    /// Work server URL (repeatable or comma separated).
    /// If omitted, the RPC URLs are used.
    #[arg(long = "work-url", env = "LATTICE_WORK_URL", value_delimiter = ',')]
    pub work_urls: Vec<String>,

    /// Timeout for each attempt against a single endpoint.
    #[arg(long, default_value = "10", env = "LATTICE_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Client-side rate limit shared by all endpoints.
    #[arg(long, env = "LATTICE_REQUESTS_PER_SECOND")]
    pub requests_per_second: Option<u32>,

    /// Ignore receivable blocks below this many raw.
    #[arg(long, env = "LATTICE_MIN_RECEIVABLE")]
    pub min_receivable: Option<Raw>,

    /// Maximum number of receivable blocks fetched per sync.
    #[arg(long, default_value_t = DEFAULT_RECEIVABLE_COUNT, env = "LATTICE_RECEIVABLE_COUNT")]
    pub receivable_count: u32,

    /// JSON file holding the account snapshot between runs.
    /// If omitted, state is in-memory only.
    #[arg(long, env = "LATTICE_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Pull account info and receivable blocks, then print the snapshot.
    Sync(AccountArgs),
    /// Print the receivable blocks and their total.
    Receivable(AccountArgs),
}

#[derive(Args)]
pub struct AccountArgs {
    /// Account address to mirror.
    #[arg(long)]
    pub address: Address,
}

impl Cli {
    pub fn settings(&self) -> WalletSettings {
        let work_endpoints = if self.work_urls.is_empty() {
            self.rpc_urls.clone()
        } else {
            self.work_urls.clone()
        };
        WalletSettings {
            rpc_endpoints: self.rpc_urls.clone(),
            work_endpoints,
            min_receivable: self
                .min_receivable
                .clone()
                .unwrap_or_else(|| Raw::from(DEFAULT_MIN_RECEIVABLE)),
            receivable_count: self.receivable_count,
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        }
    }

    pub fn address(&self) -> &Address {
        match &self.command {
            Command::Sync(args) | Command::Receivable(args) => &args.address,
        }
    }
}
